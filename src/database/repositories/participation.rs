//! Participation repository implementation
//!
//! Storage primitives for the enrollment ledger. The mutation methods take the
//! caller's transaction; the capacity decision itself lives in
//! `services::enrollment`, behind the event-row lock.

use sqlx::{PgConnection, PgPool};

use crate::models::event::Participation;
use crate::utils::errors::ConvivioError;

#[derive(Debug, Clone)]
pub struct ParticipationRepository {
    pool: PgPool,
}

impl ParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a participation inside the caller's transaction
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
    ) -> Result<Participation, ConvivioError> {
        let participation = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participations (event_id, user_id)
            VALUES ($1, $2)
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(conn)
        .await?;

        Ok(participation)
    }

    /// Count active participations for an event, inside the caller's
    /// transaction so the count is taken under the event-row lock
    pub async fn count_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
    ) -> Result<i64, ConvivioError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM participations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(conn)
                .await?;

        Ok(count.0)
    }

    /// Count active participations for an event (read-only snapshot)
    pub async fn count_active(&self, event_id: i64) -> Result<i64, ConvivioError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM participations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Check whether a (user, event) participation exists, inside the
    /// caller's transaction
    pub async fn exists(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
    ) -> Result<bool, ConvivioError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participations WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(conn)
        .await?;

        Ok(count.0 > 0)
    }

    /// Check whether a user is enrolled in an event (read-only snapshot)
    pub async fn is_enrolled(&self, event_id: i64, user_id: i64) -> Result<bool, ConvivioError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participations WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Remove a user's participation, returning whether a row was deleted
    pub async fn remove(&self, event_id: i64, user_id: i64) -> Result<bool, ConvivioError> {
        let result =
            sqlx::query("DELETE FROM participations WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List participations for an event, oldest first
    pub async fn list_by_event(&self, event_id: i64) -> Result<Vec<Participation>, ConvivioError> {
        let participations = sqlx::query_as::<_, Participation>(
            "SELECT id, user_id, event_id, registered_at FROM participations WHERE event_id = $1 ORDER BY registered_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participations)
    }

    /// Delete every participation for an event inside the caller's
    /// transaction. The event row must already be locked.
    pub async fn purge_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
    ) -> Result<u64, ConvivioError> {
        let result = sqlx::query("DELETE FROM participations WHERE event_id = $1")
            .bind(event_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every participation for a set of events inside the caller's
    /// transaction
    pub async fn purge_for_events(
        &self,
        conn: &mut PgConnection,
        event_ids: &[i64],
    ) -> Result<u64, ConvivioError> {
        if event_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM participations WHERE event_id = ANY($1)")
            .bind(event_ids)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every participation held by a user inside the caller's
    /// transaction
    pub async fn purge_for_user(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
    ) -> Result<u64, ConvivioError> {
        let result = sqlx::query("DELETE FROM participations WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}
