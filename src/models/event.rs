//! Event and participation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of an event.
///
/// Stored as the Postgres enum `event_status`. `Pending` is the initial state
/// unless the organizer owns the venue; `Approved` and `Rejected` are terminal
/// with respect to moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "UPPERCASE")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    /// Whether moderation can still act on an event in this status.
    pub fn is_decided(&self) -> bool {
        !matches!(self, EventStatus::Pending)
    }

    /// Valid moderation transitions. Approved events may be cancelled
    /// (deleted), but never move to another status.
    pub fn can_transition_to(&self, to: EventStatus) -> bool {
        matches!(
            (self, to),
            (EventStatus::Pending, EventStatus::Approved)
                | (EventStatus::Pending, EventStatus::Rejected)
        )
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "PENDING"),
            EventStatus::Approved => write!(f, "APPROVED"),
            EventStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A moderation decision on a pending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn status(&self) -> EventStatus {
        match self {
            Decision::Approved => EventStatus::Approved,
            Decision::Rejected => EventStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
    pub status: EventStatus,
    pub organizer_id: i64,
    pub venue_id: i64,
    pub category_id: Option<i64>,
    pub moderator_comment: Option<String>,
    pub rejection_reason: Option<String>,
    pub decision_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active seat at an event. At most one per (user, event) pair; never more
/// rows per event than the event's capacity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participation {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
    pub venue_id: i64,
    pub category_id: Option<i64>,
}
