//! Enrollment ledger service
//!
//! Owns the participation set of every event and enforces the capacity
//! invariant. All writes go through a transaction that first locks the event
//! row (`SELECT ... FOR UPDATE`), so concurrent joins, leaves and cascading
//! purges for one event serialize, while different events never contend.
//!
//! `enroll_in_tx` is the only code path that inserts participations. The
//! lifecycle service reuses it inside its own transactions for automatic
//! organizer enrollment, so there is exactly one place where the capacity
//! check happens.

use sqlx::PgConnection;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::event::{EventStatus, Participation};
use crate::utils::errors::{ConvivioError, Result};

#[derive(Clone)]
pub struct EnrollmentService {
    db: DatabaseService,
}

impl EnrollmentService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Enroll a user in an approved event.
    ///
    /// Under N concurrent calls racing for the last K free seats, exactly K
    /// succeed and the rest fail with `CapacityExceeded`: the event-row lock
    /// makes the count-and-insert atomic.
    pub async fn enroll(&self, event_id: i64, user_id: i64) -> Result<Participation> {
        debug!(event_id = event_id, user_id = user_id, "Enrolling user in event");

        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ConvivioError::UserNotFound { user_id })?;

        let mut tx = self.db.pool().begin().await?;
        let participation = self.enroll_in_tx(&mut tx, event_id, user_id).await?;
        tx.commit().await?;

        info!(
            event_id = event_id,
            user_id = user_id,
            participation_id = participation.id,
            "User enrolled in event"
        );
        Ok(participation)
    }

    /// The atomic check-and-insert, inside the caller's transaction.
    ///
    /// Locks the event row, then checks status, duplicate enrollment and the
    /// committed participant count against capacity before inserting.
    pub(crate) async fn enroll_in_tx(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
    ) -> Result<Participation> {
        let event = self
            .db
            .events
            .lock_by_id(conn, event_id)
            .await?
            .ok_or(ConvivioError::EventNotFound { event_id })?;

        if event.status != EventStatus::Approved {
            return Err(ConvivioError::EventNotApproved {
                event_id,
                status: event.status,
            });
        }

        if self.db.participations.exists(conn, event_id, user_id).await? {
            return Err(ConvivioError::AlreadyEnrolled { event_id, user_id });
        }

        let current = self.db.participations.count_for_event(conn, event_id).await?;
        if current >= i64::from(event.capacity) {
            return Err(ConvivioError::CapacityExceeded {
                event_id,
                capacity: event.capacity,
            });
        }

        self.db.participations.insert(conn, event_id, user_id).await
    }

    /// Remove the caller's participation
    pub async fn leave(&self, event_id: i64, user_id: i64) -> Result<()> {
        debug!(event_id = event_id, user_id = user_id, "User leaving event");

        if !self.db.participations.remove(event_id, user_id).await? {
            return Err(ConvivioError::NotEnrolled { event_id, user_id });
        }

        info!(event_id = event_id, user_id = user_id, "User left event");
        Ok(())
    }

    /// Number of active participations for an event
    pub async fn count_active(&self, event_id: i64) -> Result<i64> {
        self.db.participations.count_active(event_id).await
    }

    /// Whether a user is enrolled in an event
    pub async fn is_enrolled(&self, event_id: i64, user_id: i64) -> Result<bool> {
        self.db.participations.is_enrolled(event_id, user_id).await
    }

    /// Participants of an event, in registration order
    pub async fn list_participants(&self, event_id: i64) -> Result<Vec<Participation>> {
        self.db.participations.list_by_event(event_id).await
    }

    /// Remove every participation for an event.
    ///
    /// Locks the event row first so no concurrent enroll can land between the
    /// purge and whatever the caller does next.
    pub async fn purge_for_event(&self, event_id: i64) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;
        self.db.events.lock_by_id(&mut tx, event_id).await?;
        let purged = self.db.participations.purge_for_event(&mut tx, event_id).await?;
        tx.commit().await?;

        info!(event_id = event_id, purged = purged, "Purged participations for event");
        Ok(purged)
    }

    /// Remove every participation held by a user
    pub async fn purge_for_user(&self, user_id: i64) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;
        let purged = self.db.participations.purge_for_user(&mut tx, user_id).await?;
        tx.commit().await?;

        info!(user_id = user_id, purged = purged, "Purged participations for user");
        Ok(purged)
    }
}
