//! Reference directory repository (cities and categories)

use sqlx::PgPool;

use crate::models::venue::{Category, City};
use crate::utils::errors::ConvivioError;

#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new city
    pub async fn create_city(
        &self,
        name: &str,
        postal_code: Option<&str>,
    ) -> Result<City, ConvivioError> {
        let city = sqlx::query_as::<_, City>(
            "INSERT INTO cities (name, postal_code) VALUES ($1, $2) RETURNING id, name, postal_code",
        )
        .bind(name)
        .bind(postal_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(city)
    }

    /// List all cities
    pub async fn list_cities(&self) -> Result<Vec<City>, ConvivioError> {
        let cities =
            sqlx::query_as::<_, City>("SELECT id, name, postal_code FROM cities ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(cities)
    }

    /// Create a new category
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, ConvivioError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// List all categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, ConvivioError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
