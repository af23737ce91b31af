//! Services module
//!
//! This module contains business logic services

pub mod enrollment;
pub mod event;
pub mod moderation;
pub mod user;

// Re-export commonly used services
pub use enrollment::EnrollmentService;
pub use event::EventService;
pub use moderation::ModerationGuard;
pub use user::UserService;

use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub event_service: EventService,
    pub enrollment_service: EnrollmentService,
    db: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService) -> Self {
        let user_service = UserService::new(db.clone());
        let enrollment_service = EnrollmentService::new(db.clone());
        let event_service = EventService::new(db.clone(), enrollment_service.clone());

        Self {
            user_service,
            event_service,
            enrollment_service,
            db,
        }
    }

    /// Check that the backing store is reachable
    pub async fn health_check(&self) -> bool {
        crate::database::health_check(self.db.pool()).await.is_ok()
    }
}
