//! Moderation authorization guard
//!
//! Stateless policy checks for every status-changing operation. Callers pass
//! the resolved identities in explicitly, so the rules are plain functions of
//! their arguments and testable without any session machinery or I/O.

use crate::models::event::{Event, EventStatus};
use crate::models::user::User;
use crate::utils::errors::{ConvivioError, Result};

pub struct ModerationGuard;

impl ModerationGuard {
    /// Only the organizer may withdraw a proposal, and only while it is
    /// still pending.
    pub fn can_withdraw(caller_id: i64, event: &Event) -> Result<()> {
        if event.organizer_id != caller_id {
            return Err(ConvivioError::Forbidden(
                "only the organizer may withdraw a proposal".to_string(),
            ));
        }

        if event.status != EventStatus::Pending {
            return Err(ConvivioError::InvalidState(
                "only pending events can be withdrawn".to_string(),
            ));
        }

        Ok(())
    }

    /// Only the owner of the event's venue may approve or reject it.
    pub fn can_decide(caller_id: i64, venue_owner_id: i64) -> Result<()> {
        if venue_owner_id != caller_id {
            return Err(ConvivioError::Forbidden(
                "only the venue owner may moderate events at this venue".to_string(),
            ));
        }

        Ok(())
    }

    /// Only the owner of the event's venue may cancel a confirmed event, and
    /// only while it is approved.
    pub fn can_cancel_approved(caller_id: i64, venue_owner_id: i64, event: &Event) -> Result<()> {
        if venue_owner_id != caller_id {
            return Err(ConvivioError::Forbidden(
                "only the venue owner may cancel events at this venue".to_string(),
            ));
        }

        if event.status != EventStatus::Approved {
            return Err(ConvivioError::InvalidState(
                "only approved events can be cancelled".to_string(),
            ));
        }

        Ok(())
    }

    /// Only an administrator may delete an event unconditionally.
    pub fn can_admin_delete(caller: &User) -> Result<()> {
        if !caller.role.is_admin() {
            return Err(ConvivioError::Forbidden(
                "only an administrator may delete events".to_string(),
            ));
        }

        Ok(())
    }

    /// Only an administrator may ban a user; never themselves, never another
    /// administrator.
    pub fn can_ban(caller: &User, target: &User) -> Result<()> {
        if !caller.role.is_admin() {
            return Err(ConvivioError::Forbidden(
                "only an administrator may ban users".to_string(),
            ));
        }

        if target.id == caller.id {
            return Err(ConvivioError::Forbidden(
                "administrators cannot ban themselves".to_string(),
            ));
        }

        if target.role.is_admin() {
            return Err(ConvivioError::Forbidden(
                "administrators cannot ban other administrators".to_string(),
            ));
        }

        Ok(())
    }
}
