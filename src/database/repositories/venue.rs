//! Venue repository implementation

use sqlx::{PgConnection, PgPool};

use crate::models::venue::{CreateVenueRequest, Venue};
use crate::utils::errors::ConvivioError;

#[derive(Debug, Clone)]
pub struct VenueRepository {
    pool: PgPool,
}

impl VenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new venue
    pub async fn create(&self, request: CreateVenueRequest) -> Result<Venue, ConvivioError> {
        let venue = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (name, address, max_capacity, city_id, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, address, max_capacity, city_id, owner_id, created_at
            "#,
        )
        .bind(request.name)
        .bind(request.address)
        .bind(request.max_capacity)
        .bind(request.city_id)
        .bind(request.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(venue)
    }

    /// Find venue by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Venue>, ConvivioError> {
        let venue = sqlx::query_as::<_, Venue>(
            "SELECT id, name, address, max_capacity, city_id, owner_id, created_at FROM venues WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(venue)
    }

    /// Get all venues owned by a user
    pub async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Venue>, ConvivioError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT id, name, address, max_capacity, city_id, owner_id, created_at FROM venues WHERE owner_id = $1 ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(venues)
    }

    /// List all venues
    pub async fn list(&self) -> Result<Vec<Venue>, ConvivioError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT id, name, address, max_capacity, city_id, owner_id, created_at FROM venues ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(venues)
    }

    /// Delete all venues owned by a user inside the caller's transaction,
    /// returning the ids that were removed
    pub async fn delete_by_owner(
        &self,
        conn: &mut PgConnection,
        owner_id: i64,
    ) -> Result<Vec<i64>, ConvivioError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("DELETE FROM venues WHERE owner_id = $1 RETURNING id")
                .bind(owner_id)
                .fetch_all(conn)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
