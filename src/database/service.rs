//! Database service layer
//!
//! This module bundles the connection pool and all repositories behind a
//! single cloneable handle the services build on.

use crate::database::{
    DatabasePool, DirectoryRepository, EventRepository, ParticipationRepository, UserRepository,
    VenueRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub venues: VenueRepository,
    pub directory: DirectoryRepository,
    pub events: EventRepository,
    pub participations: ParticipationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            venues: VenueRepository::new(pool.clone()),
            directory: DirectoryRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            participations: ParticipationRepository::new(pool.clone()),
            pool,
        }
    }

    /// The underlying pool, for services that open their own transactions
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Aggregate counts for an operator dashboard
    pub async fn get_system_stats(&self) -> crate::utils::errors::Result<serde_json::Value> {
        let total_users = self.users.count().await?;
        let total_events = self.events.count().await?;
        let venues = self.venues.list().await?;

        let stats = serde_json::json!({
            "total_users": total_users,
            "total_events": total_events,
            "total_venues": venues.len(),
        });

        Ok(stats)
    }
}
