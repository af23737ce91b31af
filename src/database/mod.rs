//! Database module
//!
//! This module handles database connections, migrations, and repositories

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{create_pool, health_check, run_migrations, DatabasePool, PoolConfig};
pub use repositories::{
    DirectoryRepository, EventRepository, ParticipationRepository, UserRepository, VenueRepository,
};
pub use service::DatabaseService;
