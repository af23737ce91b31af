//! User service implementation
//!
//! Registration and lookup of platform users, plus the administrative ban,
//! which removes a user and everything that hangs off them in one
//! transaction.

use tracing::{debug, info, warn};

use crate::database::DatabaseService;
use crate::models::user::{CreateUserRequest, User};
use crate::services::moderation::ModerationGuard;
use crate::utils::errors::{ConvivioError, Result};

#[derive(Clone)]
pub struct UserService {
    db: DatabaseService,
}

impl UserService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Register a new user
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        debug!(email = %request.email, "Registering user");

        if request.display_name.trim().is_empty() {
            return Err(ConvivioError::Validation("a display name is required".to_string()));
        }

        if !request.email.contains('@') {
            return Err(ConvivioError::Validation(format!(
                "not a valid email address: {}",
                request.email
            )));
        }

        if self.db.users.find_by_email(&request.email).await?.is_some() {
            return Err(ConvivioError::EmailTaken(request.email));
        }

        let user = self.db.users.create(request).await?;
        info!(user_id = user.id, email = %user.email, role = %user.role, "User registered");

        Ok(user)
    }

    /// Get a user by id
    pub async fn get(&self, user_id: i64) -> Result<User> {
        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ConvivioError::UserNotFound { user_id })
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db.users.find_by_email(email).await
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>> {
        self.db.users.list().await
    }

    /// Ban a user, removing them and everything they anchor: their venues,
    /// every event at those venues, every event they organized elsewhere, all
    /// participations in those events, their own participations elsewhere,
    /// and finally the user record.
    ///
    /// Runs as one transaction that locks the user row and every affected
    /// event row up front; it either completes fully or leaves the pre-ban
    /// state intact.
    pub async fn ban(&self, user_id: i64, admin_id: i64) -> Result<()> {
        debug!(user_id = user_id, admin_id = admin_id, "Banning user");

        let admin = self
            .db
            .users
            .find_by_id(admin_id)
            .await?
            .ok_or(ConvivioError::Unauthenticated)?;

        let target = self
            .db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ConvivioError::UserNotFound { user_id })?;

        ModerationGuard::can_ban(&admin, &target)?;

        let mut tx = self.db.pool().begin().await?;

        self.db
            .users
            .lock_by_id(&mut tx, user_id)
            .await?
            .ok_or(ConvivioError::UserNotFound { user_id })?;

        // Events organized by the user or hosted at their venues, locked so
        // no enrollment can slip in under the purge.
        let event_ids = self.db.events.lock_for_user_cascade(&mut tx, user_id).await?;

        let purged = self.db.participations.purge_for_events(&mut tx, &event_ids).await?;
        let deleted_events = self.db.events.delete_many(&mut tx, &event_ids).await?;
        let deleted_venues = self.db.venues.delete_by_owner(&mut tx, user_id).await?;
        let own_purged = self.db.participations.purge_for_user(&mut tx, user_id).await?;
        self.db.users.delete(&mut tx, user_id).await?;

        tx.commit().await?;

        warn!(
            user_id = user_id,
            admin_id = admin_id,
            deleted_events = deleted_events,
            deleted_venues = deleted_venues.len(),
            purged_participations = purged + own_purged,
            "User banned"
        );
        Ok(())
    }
}
