//! Shared integration test helpers

pub mod database_helper;
pub mod test_data;

pub use database_helper::TestDatabase;

use convivio::{DatabaseService, ServiceFactory};

/// Everything a test needs: the disposable database, the repository layer and
/// the wired services.
pub struct TestContext {
    pub db: TestDatabase,
    pub database: DatabaseService,
    pub services: ServiceFactory,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let db = TestDatabase::new().await?;
        db.cleanup().await?;

        let database = DatabaseService::new(db.pool.clone());
        let services = ServiceFactory::new(database.clone());

        Ok(Self {
            db,
            database,
            services,
        })
    }
}
