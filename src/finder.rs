//! Film lookups against the relational catalog.
//!
//! Four access patterns are supported: title keyword, genre and/or
//! release-year range, title first letter, and single-film key lookup.
//! Each `try_*` method returns the store error to the caller; the plain
//! methods absorb it through the [`ErrorChannel`] and return an empty result,
//! so "no films" and "store failure" look the same to the interactive layer.
//!
//! Keyword and criteria searches record one query-log entry per successful
//! execution. Limits and offsets are handed to the store unmodified.

use anyhow::Result;
use sqlx::any::AnyRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::ConnectionManager;
use crate::models::{FilmRecord, SearchCategory};
use crate::query_log::QueryLogger;
use crate::report::ErrorChannel;

/// Default page size for keyword and criteria searches.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
/// Default page size for first-letter searches.
pub const DEFAULT_LETTER_LIMIT: i64 = 20;

// MySQL reports TEXT columns as BLOB to the `Any` driver, and YEAR as an
// unsigned short. Both are cast so rows decode into String and i64.
const KEYWORD_SQL: &str = r#"
    SELECT title, CAST(description AS CHAR) AS description
    FROM film_text
    WHERE title LIKE ?
    LIMIT ? OFFSET ?
"#;

const GENRE_AND_YEARS_SQL: &str = r#"
    SELECT f.title, CAST(f.release_year AS SIGNED) AS release_year, c.name AS genre
    FROM film f
    JOIN film_category fc ON f.film_id = fc.film_id
    JOIN category c ON fc.category_id = c.category_id
    WHERE c.name = ? AND f.release_year BETWEEN ? AND ?
    LIMIT ? OFFSET ?
"#;

const GENRE_SQL: &str = r#"
    SELECT f.title, CAST(f.release_year AS SIGNED) AS release_year, c.name AS genre
    FROM film f
    JOIN film_category fc ON f.film_id = fc.film_id
    JOIN category c ON fc.category_id = c.category_id
    WHERE c.name = ?
    LIMIT ? OFFSET ?
"#;

const YEARS_SQL: &str = r#"
    SELECT title, CAST(release_year AS SIGNED) AS release_year
    FROM film
    WHERE release_year BETWEEN ? AND ?
    LIMIT ? OFFSET ?
"#;

const KEY_SQL: &str = r#"
    SELECT CAST(film_id AS CHAR) AS id, title, CAST(description AS CHAR) AS description,
           CAST(release_year AS SIGNED) AS release_year
    FROM film
    WHERE CAST(film_id AS CHAR) = ? OR title = ?
    LIMIT 1
"#;

/// Optional filters for a genre/year search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub genre: Option<String>,
    pub year_from: Option<i64>,
    pub year_to: Option<i64>,
}

/// Which statement a [`SearchCriteria`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaPlan<'a> {
    GenreAndYears { genre: &'a str, from: i64, to: i64 },
    Genre { genre: &'a str },
    Years { from: i64, to: i64 },
}

impl SearchCriteria {
    /// Blank genres count as absent.
    pub fn new(genre: Option<String>, year_from: Option<i64>, year_to: Option<i64>) -> Self {
        let genre = genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        Self {
            genre,
            year_from,
            year_to,
        }
    }

    /// The statement to run, or `None` when the filters are too sparse to
    /// search (no genre and fewer than two year bounds).
    pub fn plan(&self) -> Option<CriteriaPlan<'_>> {
        match (self.genre.as_deref(), self.year_from, self.year_to) {
            (Some(genre), Some(from), Some(to)) => Some(CriteriaPlan::GenreAndYears { genre, from, to }),
            (Some(genre), _, _) => Some(CriteriaPlan::Genre { genre }),
            (None, Some(from), Some(to)) => Some(CriteriaPlan::Years { from, to }),
            _ => None,
        }
    }

    /// Query-log text, e.g. `genre:Comedy, years:2000-None`.
    pub fn descriptor(&self) -> String {
        format!(
            "genre:{}, years:{}-{}",
            self.genre.as_deref().unwrap_or("None"),
            display_opt(self.year_from),
            display_opt(self.year_to)
        )
    }
}

fn display_opt(value: Option<i64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

pub struct FilmFinder {
    connections: Arc<ConnectionManager>,
    query_log: Arc<QueryLogger>,
    errors: Arc<ErrorChannel>,
}

impl FilmFinder {
    pub fn new(
        connections: Arc<ConnectionManager>,
        query_log: Arc<QueryLogger>,
        errors: Arc<ErrorChannel>,
    ) -> Self {
        Self {
            connections,
            query_log,
            errors,
        }
    }

    /// Films whose title contains `keyword` (SQL `LIKE '%keyword%'`).
    pub async fn try_find_by_keyword(
        &self,
        keyword: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FilmRecord>> {
        tracing::debug!(keyword, limit, offset, "keyword search");
        let films = {
            let mut conn = self.connections.relational().await?;
            let rows = sqlx::query(KEYWORD_SQL)
                .bind(format!("%{}%", keyword))
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut *conn)
                .await?;
            rows.iter().map(described).collect::<Result<Vec<_>>>()?
        };

        self.query_log
            .log_search(keyword, SearchCategory::Keyword, films.len())
            .await;
        Ok(films)
    }

    pub async fn find_by_keyword(&self, keyword: &str, limit: i64, offset: i64) -> Vec<FilmRecord> {
        let result = self.try_find_by_keyword(keyword, limit, offset).await;
        self.errors
            .absorb(&format!("keyword search '{}'", keyword), result)
    }

    /// Films matching a genre, a release-year range, or both.
    pub async fn try_find_by_criteria(
        &self,
        criteria: &SearchCriteria,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FilmRecord>> {
        let Some(plan) = criteria.plan() else {
            return Ok(Vec::new());
        };

        tracing::debug!(?plan, limit, offset, "criteria search");
        let with_genre = !matches!(plan, CriteriaPlan::Years { .. });
        let films = {
            let mut conn = self.connections.relational().await?;
            let query = match plan {
                CriteriaPlan::GenreAndYears { genre, from, to } => sqlx::query(GENRE_AND_YEARS_SQL)
                    .bind(genre)
                    .bind(from)
                    .bind(to),
                CriteriaPlan::Genre { genre } => sqlx::query(GENRE_SQL).bind(genre),
                CriteriaPlan::Years { from, to } => sqlx::query(YEARS_SQL).bind(from).bind(to),
            };
            let rows = query.bind(limit).bind(offset).fetch_all(&mut *conn).await?;
            rows.iter()
                .map(|row| classified(row, with_genre))
                .collect::<Result<Vec<_>>>()?
        };

        self.query_log
            .log_search(&criteria.descriptor(), SearchCategory::GenreYear, films.len())
            .await;
        Ok(films)
    }

    pub async fn find_by_criteria(
        &self,
        criteria: &SearchCriteria,
        limit: i64,
        offset: i64,
    ) -> Vec<FilmRecord> {
        let result = self.try_find_by_criteria(criteria, limit, offset).await;
        self.errors.absorb("criteria search", result)
    }

    /// Films whose title starts with `letter`, uppercased. Not logged.
    pub async fn try_find_by_first_letter(
        &self,
        letter: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FilmRecord>> {
        tracing::debug!(letter, limit, offset, "first letter search");
        let mut conn = self.connections.relational().await?;
        let rows = sqlx::query(KEYWORD_SQL)
            .bind(format!("{}%", letter.to_uppercase()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(described).collect()
    }

    pub async fn find_by_first_letter(
        &self,
        letter: &str,
        limit: i64,
        offset: i64,
    ) -> Vec<FilmRecord> {
        let result = self.try_find_by_first_letter(letter, limit, offset).await;
        self.errors.absorb("first letter search", result)
    }

    /// A single film whose id or exact title equals `key`. Not logged.
    pub async fn try_find_by_key(&self, key: &str) -> Result<Option<FilmRecord>> {
        let mut conn = self.connections.relational().await?;
        let row = sqlx::query(KEY_SQL)
            .bind(key)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(detailed).transpose()
    }

    pub async fn find_by_key(&self, key: &str) -> Option<FilmRecord> {
        let result = self.try_find_by_key(key).await;
        self.errors.absorb(&format!("film lookup '{}'", key), result)
    }
}

fn described(row: &AnyRow) -> Result<FilmRecord> {
    Ok(FilmRecord::Described {
        title: row.try_get("title")?,
        description: row.try_get("description")?,
    })
}

fn classified(row: &AnyRow, with_genre: bool) -> Result<FilmRecord> {
    let genre: Option<String> = if with_genre {
        row.try_get("genre")?
    } else {
        None
    };
    Ok(FilmRecord::Classified {
        title: row.try_get("title")?,
        release_year: row.try_get("release_year")?,
        genre,
    })
}

fn detailed(row: &AnyRow) -> Result<FilmRecord> {
    Ok(FilmRecord::Detailed {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        release_year: row.try_get("release_year")?,
    })
}
