//! User repository implementation

use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUserRequest, Role, User};
use crate::utils::errors::ConvivioError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, ConvivioError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, display_name, role, created_at
            "#,
        )
        .bind(request.email)
        .bind(request.display_name)
        .bind(request.role.unwrap_or(Role::Member))
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ConvivioError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ConvivioError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, ConvivioError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, role, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, ConvivioError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Lock a user row for the remainder of the caller's transaction.
    ///
    /// The ban cascade takes this lock first so concurrent operations keyed on
    /// the same user serialize behind it.
    pub async fn lock_by_id(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<User>, ConvivioError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, role, created_at FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Delete a user inside the caller's transaction
    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), ConvivioError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }
}
