//! Convivio events core
//!
//! Backend core for a community dining platform: members propose social
//! events hosted at partner venues, venue owners moderate the proposals, and
//! approved events accept a bounded number of guests. Enrollment is
//! capacity-safe under concurrency; moderation, withdrawal, cancellation and
//! bans cascade transactionally.
//!
//! Transport adapters (HTTP, bot, CLI) are expected to live outside this
//! crate and drive it through [`services::ServiceFactory`].

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ConvivioError, ErrorKind, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
