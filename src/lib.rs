//! # Film Catalog
//!
//! A command-line film catalog search tool. Films live in a relational store
//! (MySQL in production, SQLite works too); every search is recorded in a
//! document-store query log (MongoDB) that feeds a statistics screen.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ Menu / CLI   │──▶│  FilmFinder  │──▶│ relational store │
//! │  (films)     │   │  Metadata    │   └──────────────────┘
//! └──────┬───────┘   └──────┬───────┘
//!        │                  ▼
//!        │           ┌──────────────┐   ┌──────────────────┐
//!        └──────────▶│ QueryLogger  │──▶│  document store  │
//!                    └──────────────┘   └──────────────────┘
//! ```
//!
//! Both store handles are owned by one [`db::ConnectionManager`] shared by
//! every component.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration |
//! | [`db`] | Cached, health-checked store handles |
//! | [`finder`] | Keyword, genre/year, first-letter and key lookups |
//! | [`metadata`] | Genre list and release-year range |
//! | [`query_log`] | Search logging and query statistics |
//! | [`report`] | Error channel and log setup |
//! | [`menu`] | Interactive menu loop |
//! | [`display`] | Result rendering |

pub mod config;
pub mod db;
pub mod display;
pub mod finder;
pub mod get;
pub mod menu;
pub mod metadata;
pub mod models;
pub mod query_log;
pub mod report;
pub mod search;
pub mod stats;

use std::sync::Arc;

use config::{Config, LogBackend};
use db::ConnectionManager;
use finder::FilmFinder;
use metadata::CatalogMetadata;
use query_log::{InMemoryQueryLog, MongoQueryLog, QueryLogStore, QueryLogger};
use report::ErrorChannel;

/// All catalog components wired to one shared set of store handles.
pub struct Catalog {
    pub config: Config,
    pub connections: Arc<ConnectionManager>,
    pub errors: Arc<ErrorChannel>,
    pub query_log: Arc<QueryLogger>,
    pub finder: FilmFinder,
    pub metadata: CatalogMetadata,
}

impl Catalog {
    /// Build the catalog. No store is contacted until the first lookup.
    pub fn new(config: Config) -> Self {
        let connections = Arc::new(ConnectionManager::new(
            config.relational.clone(),
            config.document.clone(),
        ));
        let store: Arc<dyn QueryLogStore> = match config.document.backend {
            LogBackend::Mongodb => Arc::new(MongoQueryLog::new(connections.clone())),
            LogBackend::Memory => Arc::new(InMemoryQueryLog::new()),
        };
        Self::with_log_store(config, connections, store)
    }

    /// Build the catalog around an existing query-log store.
    pub fn with_log_store(
        config: Config,
        connections: Arc<ConnectionManager>,
        store: Arc<dyn QueryLogStore>,
    ) -> Self {
        let errors = Arc::new(ErrorChannel::new());
        let query_log = Arc::new(QueryLogger::new(store, errors.clone()));
        let finder = FilmFinder::new(connections.clone(), query_log.clone(), errors.clone());
        let metadata = CatalogMetadata::new(connections.clone(), errors.clone());
        Self {
            config,
            connections,
            errors,
            query_log,
            finder,
            metadata,
        }
    }

    /// Release both store handles.
    pub async fn shutdown(&self) {
        self.connections.release_all().await;
    }
}
