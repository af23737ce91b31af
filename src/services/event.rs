//! Event lifecycle service
//!
//! Owns event records and their state transitions: proposal, moderation
//! decision, organizer withdrawal, venue-owner cancellation and
//! administrative deletion. Enrollment side effects go through the enrollment
//! ledger; cascading deletes run in a single transaction that locks the event
//! row first, so a deletion can never interleave with a concurrent join.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::event::{Decision, Event, EventStatus, Participation, ProposeEventRequest};
use crate::services::enrollment::EnrollmentService;
use crate::services::moderation::ModerationGuard;
use crate::utils::errors::{ConvivioError, Result};

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    enrollment: EnrollmentService,
}

impl EventService {
    pub fn new(db: DatabaseService, enrollment: EnrollmentService) -> Self {
        Self { db, enrollment }
    }

    /// Propose a new event at a venue.
    ///
    /// Created `Pending`, unless the organizer owns the venue: then the event
    /// is approved on the spot and the organizer takes the first seat, in the
    /// same transaction.
    pub async fn propose(&self, request: ProposeEventRequest, organizer_id: i64) -> Result<Event> {
        debug!(
            organizer_id = organizer_id,
            venue_id = request.venue_id,
            title = %request.title,
            "Proposing event"
        );

        validate_proposal(&request)?;

        let organizer = self
            .db
            .users
            .find_by_id(organizer_id)
            .await?
            .ok_or(ConvivioError::Unauthenticated)?;

        let venue = self
            .db
            .venues
            .find_by_id(request.venue_id)
            .await?
            .ok_or(ConvivioError::VenueNotFound { venue_id: request.venue_id })?;

        if venue.max_capacity > 0 && request.capacity > venue.max_capacity {
            return Err(ConvivioError::Validation(format!(
                "capacity {} exceeds the venue ceiling of {}",
                request.capacity, venue.max_capacity
            )));
        }

        let status = if venue.owner_id == organizer.id {
            EventStatus::Approved
        } else {
            EventStatus::Pending
        };

        let mut tx = self.db.pool().begin().await?;
        let event = self.db.events.insert(&mut tx, &request, organizer.id, status).await?;

        // A self-approved event starts with its organizer enrolled.
        if event.status == EventStatus::Approved {
            self.enrollment.enroll_in_tx(&mut tx, event.id, organizer.id).await?;
        }

        tx.commit().await?;

        info!(
            event_id = event.id,
            organizer_id = organizer.id,
            venue_id = venue.id,
            status = %event.status,
            "Event proposed"
        );
        Ok(event)
    }

    /// Approve or reject a pending event.
    ///
    /// The decider must own the event's venue. Approval stores the moderator
    /// comment and enrolls the organizer (idempotently); rejection requires a
    /// non-empty reason. Decided events cannot be decided again.
    pub async fn decide(
        &self,
        event_id: i64,
        decider_id: i64,
        decision: Decision,
        comment: &str,
    ) -> Result<Event> {
        debug!(
            event_id = event_id,
            decider_id = decider_id,
            decision = ?decision,
            "Moderating event"
        );

        self.db
            .users
            .find_by_id(decider_id)
            .await?
            .ok_or(ConvivioError::Unauthenticated)?;

        let mut tx = self.db.pool().begin().await?;

        let event = self
            .db
            .events
            .lock_by_id(&mut tx, event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })?;

        let venue = self
            .db
            .venues
            .find_by_id(event.venue_id)
            .await?
            .ok_or(ConvivioError::VenueNotFound { venue_id: event.venue_id })?;

        ModerationGuard::can_decide(decider_id, venue.owner_id)?;

        let target = decision.status();
        if !event.status.can_transition_to(target) {
            return Err(ConvivioError::InvalidStateTransition {
                from: event.status,
                to: target,
            });
        }

        let updated = match decision {
            Decision::Approved => {
                let comment = Some(comment.trim()).filter(|c| !c.is_empty());
                self.db
                    .events
                    .set_decision(&mut tx, event_id, target, comment, None)
                    .await?
            }
            Decision::Rejected => {
                let reason = comment.trim();
                if reason.is_empty() {
                    return Err(ConvivioError::Validation(
                        "a rejection reason is required".to_string(),
                    ));
                }
                self.db
                    .events
                    .set_decision(&mut tx, event_id, target, None, Some(reason))
                    .await?
            }
        };

        if decision == Decision::Approved {
            // Idempotent: the organizer may already hold a seat.
            match self.enrollment.enroll_in_tx(&mut tx, event_id, event.organizer_id).await {
                Ok(_) | Err(ConvivioError::AlreadyEnrolled { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;

        info!(
            event_id = event_id,
            decider_id = decider_id,
            status = %updated.status,
            "Event moderated"
        );
        Ok(updated)
    }

    /// Organizer retracts their own proposal while it is still pending.
    /// No participations can exist before approval, so there is nothing to
    /// cascade.
    pub async fn withdraw(&self, event_id: i64, organizer_id: i64) -> Result<()> {
        debug!(event_id = event_id, organizer_id = organizer_id, "Withdrawing event proposal");

        let mut tx = self.db.pool().begin().await?;

        let event = self
            .db
            .events
            .lock_by_id(&mut tx, event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })?;

        ModerationGuard::can_withdraw(organizer_id, &event)?;

        self.db.events.delete(&mut tx, event_id).await?;
        tx.commit().await?;

        info!(event_id = event_id, organizer_id = organizer_id, "Event proposal withdrawn");
        Ok(())
    }

    /// Venue owner cancels a confirmed event. Purge-then-delete runs under
    /// the event-row lock, so no join can survive the cancellation.
    pub async fn cancel_approved(&self, event_id: i64, owner_id: i64) -> Result<()> {
        debug!(event_id = event_id, owner_id = owner_id, "Cancelling approved event");

        let mut tx = self.db.pool().begin().await?;

        let event = self
            .db
            .events
            .lock_by_id(&mut tx, event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })?;

        let venue = self
            .db
            .venues
            .find_by_id(event.venue_id)
            .await?
            .ok_or(ConvivioError::VenueNotFound { venue_id: event.venue_id })?;

        ModerationGuard::can_cancel_approved(owner_id, venue.owner_id, &event)?;

        let purged = self.db.participations.purge_for_event(&mut tx, event_id).await?;
        self.db.events.delete(&mut tx, event_id).await?;
        tx.commit().await?;

        info!(
            event_id = event_id,
            owner_id = owner_id,
            purged = purged,
            "Approved event cancelled"
        );
        Ok(())
    }

    /// Unconditional deletion by an administrator, any status. Same cascade
    /// as cancellation, no ownership check.
    pub async fn admin_delete(&self, event_id: i64, admin_id: i64) -> Result<()> {
        debug!(event_id = event_id, admin_id = admin_id, "Admin deleting event");

        let admin = self
            .db
            .users
            .find_by_id(admin_id)
            .await?
            .ok_or(ConvivioError::Unauthenticated)?;

        ModerationGuard::can_admin_delete(&admin)?;

        let mut tx = self.db.pool().begin().await?;

        self.db
            .events
            .lock_by_id(&mut tx, event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })?;

        let purged = self.db.participations.purge_for_event(&mut tx, event_id).await?;
        self.db.events.delete(&mut tx, event_id).await?;
        tx.commit().await?;

        info!(event_id = event_id, admin_id = admin_id, purged = purged, "Event deleted by admin");
        Ok(())
    }

    /// Get an event by id
    pub async fn get(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })
    }

    /// All events with a given status
    pub async fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        self.db.events.list_by_status(status).await
    }

    /// All approved events
    pub async fn list_approved(&self) -> Result<Vec<Event>> {
        self.db.events.list_by_status(EventStatus::Approved).await
    }

    /// Events visible on the public board (approved or pending)
    pub async fn list_approved_or_pending(&self) -> Result<Vec<Event>> {
        self.db.events.list_approved_or_pending().await
    }

    /// Events hosted at a venue
    pub async fn list_by_venue(&self, venue_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_by_venue(venue_id).await
    }

    /// Events created by a user
    pub async fn list_created_by_user(&self, user_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_by_organizer(user_id).await
    }

    /// Events a user has joined
    pub async fn list_joined_by_user(&self, user_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_joined_by_user(user_id).await
    }

    /// Pending proposals across every venue the owner runs
    pub async fn list_pending_for_venue_owner(&self, owner_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_by_owner_and_status(owner_id, EventStatus::Pending).await
    }

    /// Approved events across every venue the owner runs
    pub async fn list_approved_for_venue_owner(&self, owner_id: i64) -> Result<Vec<Event>> {
        self.db.events.list_by_owner_and_status(owner_id, EventStatus::Approved).await
    }

    /// Participants of an event, in registration order
    pub async fn list_participants(&self, event_id: i64) -> Result<Vec<Participation>> {
        self.db.participations.list_by_event(event_id).await
    }

    /// Whether a user is enrolled in an event
    pub async fn is_enrolled(&self, event_id: i64, user_id: i64) -> Result<bool> {
        self.db.participations.is_enrolled(event_id, user_id).await
    }
}

fn validate_proposal(request: &ProposeEventRequest) -> Result<()> {
    if request.title.trim().is_empty() {
        return Err(ConvivioError::Validation("a title is required".to_string()));
    }

    if request.capacity <= 0 {
        return Err(ConvivioError::Validation(
            "capacity must be a positive number".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(title: &str, capacity: i32) -> ProposeEventRequest {
        ProposeEventRequest {
            title: title.to_string(),
            description: None,
            event_date: Utc::now(),
            capacity,
            venue_id: 1,
            category_id: None,
        }
    }

    #[test]
    fn test_proposal_requires_title() {
        assert!(validate_proposal(&request("  ", 10)).is_err());
        assert!(validate_proposal(&request("Pizza night", 10)).is_ok());
    }

    #[test]
    fn test_proposal_requires_positive_capacity() {
        assert!(validate_proposal(&request("Pizza night", 0)).is_err());
        assert!(validate_proposal(&request("Pizza night", -3)).is_err());
        assert!(validate_proposal(&request("Pizza night", 1)).is_ok());
    }
}
