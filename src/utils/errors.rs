//! Error handling for Convivio
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

use crate::models::event::EventStatus;

/// Main error type for Convivio operations
#[derive(Error, Debug)]
pub enum ConvivioError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown caller identity")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Venue not found: {venue_id}")]
    VenueNotFound { venue_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("User {user_id} is not enrolled in event {event_id}")]
    NotEnrolled { event_id: i64, user_id: i64 },

    #[error("User {user_id} is already enrolled in event {event_id}")]
    AlreadyEnrolled { event_id: i64, user_id: i64 },

    #[error("Event {event_id} is full: capacity {capacity} reached")]
    CapacityExceeded { event_id: i64, capacity: i32 },

    #[error("Event {event_id} is not approved (status: {status})")]
    EventNotApproved { event_id: i64, status: EventStatus },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: EventStatus, to: EventStatus },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Convivio operations
pub type Result<T> = std::result::Result<T, ConvivioError>;

/// Stable error classification exposed to transport adapters.
///
/// Every variant of [`ConvivioError`] maps to exactly one kind, so an adapter
/// can translate to status codes without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    InvalidState,
    Conflict,
    Validation,
    Internal,
}

impl ConvivioError {
    /// Classify the error into its stable kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvivioError::UserNotFound { .. }
            | ConvivioError::VenueNotFound { .. }
            | ConvivioError::EventNotFound { .. }
            | ConvivioError::NotEnrolled { .. } => ErrorKind::NotFound,
            ConvivioError::Unauthenticated => ErrorKind::Unauthorized,
            ConvivioError::Forbidden(_) => ErrorKind::Forbidden,
            ConvivioError::EventNotApproved { .. }
            | ConvivioError::InvalidStateTransition { .. }
            | ConvivioError::InvalidState(_) => ErrorKind::InvalidState,
            ConvivioError::AlreadyEnrolled { .. }
            | ConvivioError::CapacityExceeded { .. }
            | ConvivioError::EmailTaken(_) => ErrorKind::Conflict,
            ConvivioError::Validation(_) => ErrorKind::Validation,
            ConvivioError::Database(_)
            | ConvivioError::Migration(_)
            | ConvivioError::Config(_)
            | ConvivioError::Serialization(_)
            | ConvivioError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Check whether the error is an expected business outcome rather than a
    /// fault. `CapacityExceeded` and `AlreadyEnrolled` happen constantly on a
    /// busy event and callers treat them as normal responses.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ConvivioError::AlreadyEnrolled { .. }
                | ConvivioError::CapacityExceeded { .. }
                | ConvivioError::NotEnrolled { .. }
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorKind::Forbidden => write!(f, "FORBIDDEN"),
            ErrorKind::InvalidState => write!(f, "INVALID_STATE"),
            ErrorKind::Conflict => write!(f, "CONFLICT"),
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}
