//! Core data models used throughout the film catalog.
//!
//! Film records are tagged by the query shape that produced them, so the
//! display layer never has to guess which columns a row carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A film row returned from the relational catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilmRecord {
    /// Title search over `film_text` (keyword and first-letter lookups).
    Described {
        title: String,
        description: Option<String>,
    },
    /// Genre and/or release-year search over `film`.
    Classified {
        title: String,
        release_year: Option<i64>,
        genre: Option<String>,
    },
    /// Single film fetched by id or exact title.
    Detailed {
        id: String,
        title: String,
        description: Option<String>,
        release_year: Option<i64>,
    },
}

impl FilmRecord {
    pub fn title(&self) -> &str {
        match self {
            FilmRecord::Described { title, .. }
            | FilmRecord::Classified { title, .. }
            | FilmRecord::Detailed { title, .. } => title,
        }
    }

    pub fn release_year(&self) -> Option<i64> {
        match self {
            FilmRecord::Described { .. } => None,
            FilmRecord::Classified { release_year, .. }
            | FilmRecord::Detailed { release_year, .. } => *release_year,
        }
    }
}

/// The kind of search a query-log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    Keyword,
    GenreYear,
}

impl SearchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::Keyword => "keyword",
            SearchCategory::GenreYear => "genre_year",
        }
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded search event. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub search_type: SearchCategory,
    pub results_count: u64,
    pub timestamp: DateTime<Utc>,
}

/// Query-log entries grouped by exact query text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularQuery {
    pub query: String,
    pub count: u64,
    /// Category of the first entry seen in the group.
    pub search_type: SearchCategory,
    pub last_searched: DateTime<Utc>,
}

/// Oldest and newest release year in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}
