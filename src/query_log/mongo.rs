//! MongoDB-backed [`QueryLogStore`].
//!
//! Entries are stored as `{query, search_type, timestamp, results_count}`
//! documents. Popularity is computed server-side with a `$group` pipeline.
//! Reads decode row by row; a document that does not fit the expected shape
//! is skipped with a warning.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::Collection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::QueryLogStore;
use crate::db::ConnectionManager;
use crate::models::{PopularQuery, QueryLogEntry, SearchCategory};

/// Stored shape of one query-log entry.
#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    query: String,
    search_type: SearchCategory,
    timestamp: bson::DateTime,
    results_count: i64,
}

impl From<&QueryLogEntry> for LogDocument {
    fn from(entry: &QueryLogEntry) -> Self {
        Self {
            query: entry.query.clone(),
            search_type: entry.search_type,
            timestamp: bson::DateTime::from_chrono(entry.timestamp),
            results_count: i64::try_from(entry.results_count).unwrap_or(i64::MAX),
        }
    }
}

impl From<LogDocument> for QueryLogEntry {
    fn from(doc: LogDocument) -> Self {
        Self {
            query: doc.query,
            search_type: doc.search_type,
            results_count: u64::try_from(doc.results_count).unwrap_or(0),
            timestamp: doc.timestamp.to_chrono(),
        }
    }
}

/// One `$group` output row.
#[derive(Debug, Deserialize)]
struct PopularDocument {
    #[serde(rename = "_id")]
    query: String,
    count: i64,
    search_type: SearchCategory,
    last_searched: bson::DateTime,
}

pub struct MongoQueryLog {
    connections: Arc<ConnectionManager>,
}

impl MongoQueryLog {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    async fn collection<T: Send + Sync>(&self) -> Result<Collection<T>> {
        let database = self.connections.document().await?;
        Ok(database.collection(self.connections.log_collection()))
    }
}

/// Decode each row, dropping the ones that do not match `T`.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Document>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match bson::from_document::<T>(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed query log document");
                None
            }
        })
        .collect()
}

/// Aggregation grouping entries by exact query text.
fn popular_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$query",
                "count": { "$sum": 1 },
                "search_type": { "$first": "$search_type" },
                "last_searched": { "$max": "$timestamp" },
            }
        },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

#[async_trait]
impl QueryLogStore for MongoQueryLog {
    async fn insert(&self, entry: &QueryLogEntry) -> Result<()> {
        let collection = self.collection::<LogDocument>().await?;
        collection
            .insert_one(LogDocument::from(entry))
            .await
            .context("Failed to insert query log entry")?;
        Ok(())
    }

    async fn popular(&self, limit: i64) -> Result<Vec<PopularQuery>> {
        let collection = self.collection::<Document>().await?;
        let cursor = collection
            .aggregate(popular_pipeline(limit))
            .await
            .context("Failed to aggregate popular queries")?;
        let rows: Vec<Document> = cursor.try_collect().await?;

        Ok(decode_rows::<PopularDocument>(rows)
            .into_iter()
            .map(|group| PopularQuery {
                query: group.query,
                count: u64::try_from(group.count).unwrap_or(0),
                search_type: group.search_type,
                last_searched: group.last_searched.to_chrono(),
            })
            .collect())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<QueryLogEntry>> {
        let collection = self.collection::<Document>().await?;
        let cursor = collection
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .limit(limit)
            .await
            .context("Failed to read recent queries")?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        Ok(decode_rows::<LogDocument>(rows)
            .into_iter()
            .map(QueryLogEntry::from)
            .collect())
    }
}
