//! In-memory [`QueryLogStore`] for tests and runs without a document store.
//!
//! Entries live in a `Vec` behind `std::sync::RwLock`, in insertion order.
//! Grouping keeps first-seen order, so ties in count stay stable.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::QueryLogStore;
use crate::models::{PopularQuery, QueryLogEntry};

pub struct InMemoryQueryLog {
    entries: RwLock<Vec<QueryLogEntry>>,
}

impl InMemoryQueryLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every stored entry, oldest first.
    pub fn entries(&self) -> Result<Vec<QueryLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("query log lock poisoned"))?;
        Ok(entries.clone())
    }
}

impl Default for InMemoryQueryLog {
    fn default() -> Self {
        Self::new()
    }
}

fn limit_to_len(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl QueryLogStore for InMemoryQueryLog {
    async fn insert(&self, entry: &QueryLogEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("query log lock poisoned"))?;
        entries.push(entry.clone());
        Ok(())
    }

    async fn popular(&self, limit: i64) -> Result<Vec<PopularQuery>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("query log lock poisoned"))?;

        let mut groups: Vec<PopularQuery> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for entry in entries.iter() {
            match index.get(entry.query.as_str()) {
                Some(&i) => {
                    let group = &mut groups[i];
                    group.count += 1;
                    if entry.timestamp > group.last_searched {
                        group.last_searched = entry.timestamp;
                    }
                }
                None => {
                    index.insert(entry.query.as_str(), groups.len());
                    groups.push(PopularQuery {
                        query: entry.query.clone(),
                        count: 1,
                        search_type: entry.search_type,
                        last_searched: entry.timestamp,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        groups.truncate(limit_to_len(limit));
        Ok(groups)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<QueryLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("query log lock poisoned"))?;

        let mut recent: Vec<QueryLogEntry> = entries.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit_to_len(limit));
        Ok(recent)
    }
}
