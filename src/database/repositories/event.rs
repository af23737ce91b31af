//! Event repository implementation

use sqlx::{PgConnection, PgPool};

use crate::models::event::{Event, EventStatus, ProposeEventRequest};
use crate::utils::errors::ConvivioError;

const EVENT_COLUMNS: &str = "id, title, description, event_date, capacity, status, organizer_id, venue_id, category_id, moderator_comment, rejection_reason, decision_date, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event inside the caller's transaction
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        request: &ProposeEventRequest,
        organizer_id: i64,
        status: EventStatus,
    ) -> Result<Event, ConvivioError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, event_date, capacity, status, organizer_id, venue_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.event_date)
        .bind(request.capacity)
        .bind(status)
        .bind(organizer_id)
        .bind(request.venue_id)
        .bind(request.category_id)
        .fetch_one(conn)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, ConvivioError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Lock an event row for the remainder of the caller's transaction.
    ///
    /// Every operation that mutates an event's participations or deletes the
    /// event takes this lock first, which is what serializes enrollment,
    /// moderation and deletion per event.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Event>, ConvivioError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(event)
    }

    /// Lock every event organized by the user or hosted at one of their
    /// venues, returning the locked ids. Used by the ban cascade.
    pub async fn lock_for_user_cascade(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
    ) -> Result<Vec<i64>, ConvivioError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM events
            WHERE organizer_id = $1
               OR venue_id IN (SELECT id FROM venues WHERE owner_id = $1)
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Record a moderation decision inside the caller's transaction
    pub async fn set_decision(
        &self,
        conn: &mut PgConnection,
        id: i64,
        status: EventStatus,
        moderator_comment: Option<&str>,
        rejection_reason: Option<&str>,
    ) -> Result<Event, ConvivioError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET status = $2,
                moderator_comment = $3,
                rejection_reason = $4,
                decision_date = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(moderator_comment)
        .bind(rejection_reason)
        .fetch_one(conn)
        .await?;

        Ok(event)
    }

    /// Delete an event inside the caller's transaction
    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), ConvivioError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Delete a set of events inside the caller's transaction
    pub async fn delete_many(
        &self,
        conn: &mut PgConnection,
        ids: &[i64],
    ) -> Result<u64, ConvivioError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM events WHERE id = ANY($1)")
            .bind(ids)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// List events with a given status
    pub async fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 ORDER BY event_date ASC"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events that are visible on the public board (approved or still
    /// awaiting moderation)
    pub async fn list_approved_or_pending(&self) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 OR status = $2 ORDER BY event_date ASC"
        ))
        .bind(EventStatus::Approved)
        .bind(EventStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events hosted at a venue
    pub async fn list_by_venue(&self, venue_id: i64) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE venue_id = $1 ORDER BY event_date ASC"
        ))
        .bind(venue_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events created by a user
    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY event_date ASC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events the user has joined
    pub async fn list_joined_by_user(&self, user_id: i64) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.title, e.description, e.event_date, e.capacity, e.status, e.organizer_id, e.venue_id, e.category_id, e.moderator_comment, e.rejection_reason, e.decision_date, e.created_at, e.updated_at
            FROM events e
            INNER JOIN participations p ON e.id = p.event_id
            WHERE p.user_id = $1
            ORDER BY e.event_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events with a given status across every venue a user owns
    pub async fn list_by_owner_and_status(
        &self,
        owner_id: i64,
        status: EventStatus,
    ) -> Result<Vec<Event>, ConvivioError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE status = $2
              AND venue_id IN (SELECT id FROM venues WHERE owner_id = $1)
            ORDER BY event_date ASC
            "#
        ))
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64, ConvivioError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
