//! Search query log.
//!
//! Every successful catalog search appends one [`QueryLogEntry`]; the
//! statistics screen reads them back grouped by query text or ordered by
//! time. Storage is pluggable through the [`QueryLogStore`] trait:
//!
//! | Backend | Type | Use |
//! |---------|------|-----|
//! | MongoDB | [`MongoQueryLog`] | production document store |
//! | memory | [`InMemoryQueryLog`] | tests, offline runs |

pub mod memory;
pub mod mongo;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::models::{PopularQuery, QueryLogEntry, SearchCategory};
use crate::report::ErrorChannel;

pub use memory::InMemoryQueryLog;
pub use mongo::MongoQueryLog;

/// Default number of rows for the popular/recent read-backs.
pub const DEFAULT_STATS_LIMIT: i64 = 5;

/// Abstract storage for query-log entries.
#[async_trait]
pub trait QueryLogStore: Send + Sync {
    /// Append one entry.
    async fn insert(&self, entry: &QueryLogEntry) -> Result<()>;

    /// Entries grouped by exact query text, most frequent first.
    async fn popular(&self, limit: i64) -> Result<Vec<PopularQuery>>;

    /// Newest entries first.
    async fn recent(&self, limit: i64) -> Result<Vec<QueryLogEntry>>;
}

/// Records searches and reads back query statistics.
///
/// The logger stamps entries itself; callers only say what was searched.
/// Store failures are reported through the [`ErrorChannel`] and never reach
/// the caller.
pub struct QueryLogger {
    store: Arc<dyn QueryLogStore>,
    errors: Arc<ErrorChannel>,
}

impl QueryLogger {
    pub fn new(store: Arc<dyn QueryLogStore>, errors: Arc<ErrorChannel>) -> Self {
        Self { store, errors }
    }

    /// Append one entry stamped with the current UTC time. Dropped on failure.
    pub async fn log_search(&self, query: &str, category: SearchCategory, results_count: usize) {
        let entry = QueryLogEntry {
            query: query.to_string(),
            search_type: category,
            results_count: results_count as u64,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.store.insert(&entry).await {
            self.errors.record("query logging", &e);
        }
    }

    pub async fn try_popular(&self, limit: i64) -> Result<Vec<PopularQuery>> {
        self.store.popular(limit).await
    }

    pub async fn get_popular(&self, limit: i64) -> Vec<PopularQuery> {
        let result = self.try_popular(limit).await;
        self.errors.absorb("popular queries lookup", result)
    }

    pub async fn try_recent(&self, limit: i64) -> Result<Vec<QueryLogEntry>> {
        self.store.recent(limit).await
    }

    pub async fn get_recent(&self, limit: i64) -> Vec<QueryLogEntry> {
        let result = self.try_recent(limit).await;
        self.errors.absorb("recent queries lookup", result)
    }
}
