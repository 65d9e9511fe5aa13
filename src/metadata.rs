//! Catalog metadata: known genres and the release-year span.
//!
//! Used to prompt the user with valid filter values before a genre/year
//! search. Lookups here are never recorded in the query log.

use anyhow::Result;
use sqlx::Row;
use std::sync::Arc;

use crate::db::ConnectionManager;
use crate::models::YearRange;
use crate::report::ErrorChannel;

pub struct CatalogMetadata {
    connections: Arc<ConnectionManager>,
    errors: Arc<ErrorChannel>,
}

impl CatalogMetadata {
    pub fn new(connections: Arc<ConnectionManager>, errors: Arc<ErrorChannel>) -> Self {
        Self {
            connections,
            errors,
        }
    }

    /// Every genre label in the `category` reference table.
    pub async fn try_list_genres(&self) -> Result<Vec<String>> {
        let mut conn = self.connections.relational().await?;
        let rows = sqlx::query("SELECT name AS genre FROM category")
            .fetch_all(&mut *conn)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("genre").map_err(Into::into))
            .collect()
    }

    pub async fn list_genres(&self) -> Vec<String> {
        let result = self.try_list_genres().await;
        self.errors.absorb("genre listing", result)
    }

    pub async fn try_year_range(&self) -> Result<YearRange> {
        let mut conn = self.connections.relational().await?;
        let row = sqlx::query(
            r#"
            SELECT CAST(MIN(release_year) AS SIGNED) AS min_year,
                   CAST(MAX(release_year) AS SIGNED) AS max_year
            FROM film
            "#,
        )
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(YearRange {
                min_year: row.try_get("min_year")?,
                max_year: row.try_get("max_year")?,
            }),
            None => Ok(YearRange::default()),
        }
    }

    /// Oldest and newest release year; both `None` when the catalog is
    /// empty or unreachable.
    pub async fn year_range(&self) -> YearRange {
        let result = self.try_year_range().await;
        self.errors.absorb("year range lookup", result)
    }
}
