//! Connection management for the relational catalog and the query-log store.
//!
//! A [`ConnectionManager`] owns at most one live handle per store. Each
//! accessor pings the cached handle and rebuilds it from configuration when
//! the ping fails, so callers never receive a handle known to be dead.
//! Handles are guarded by async mutexes; the relational accessor returns a
//! guard that serializes statement execution.

use anyhow::{Context, Result};
use mongodb::bson::doc;
use sqlx::{AnyConnection, Connection};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::config::{DocumentConfig, RelationalConfig};

/// Exclusive access to the cached relational connection.
pub type RelationalHandle<'a> = MappedMutexGuard<'a, AnyConnection>;

struct DocumentSlot {
    client: mongodb::Client,
    database: mongodb::Database,
}

pub struct ConnectionManager {
    relational_config: RelationalConfig,
    document_config: DocumentConfig,
    relational: Mutex<Option<AnyConnection>>,
    document: Mutex<Option<DocumentSlot>>,
    reconnects: AtomicUsize,
    #[cfg(test)]
    fail_next_ping: std::sync::atomic::AtomicBool,
}

impl ConnectionManager {
    pub fn new(relational_config: RelationalConfig, document_config: DocumentConfig) -> Self {
        sqlx::any::install_default_drivers();
        Self {
            relational_config,
            document_config,
            relational: Mutex::new(None),
            document: Mutex::new(None),
            reconnects: AtomicUsize::new(0),
            #[cfg(test)]
            fail_next_ping: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Return a live relational connection, creating or replacing the cached
    /// one as needed.
    pub async fn relational(&self) -> Result<RelationalHandle<'_>> {
        let mut slot = self.relational.lock().await;

        let stale = match slot.as_mut() {
            Some(conn) => match self.ping_relational(conn).await {
                Ok(()) => false,
                Err(e) => {
                    tracing::debug!(error = %e, "relational ping failed, reconnecting");
                    true
                }
            },
            None => false,
        };
        if stale {
            self.reconnects.fetch_add(1, Ordering::Relaxed);
            if let Some(dead) = slot.take() {
                // Already unreachable; the close result carries no information.
                let _ = dead.close().await;
            }
        }

        if slot.is_none() {
            let conn = connect_relational(&self.relational_config).await?;
            *slot = Some(conn);
        }

        MutexGuard::try_map(slot, |slot| slot.as_mut())
            .map_err(|_| anyhow::anyhow!("relational connection slot is empty"))
    }

    /// Return a live handle to the query-log database.
    pub async fn document(&self) -> Result<mongodb::Database> {
        let mut slot = self.document.lock().await;

        if let Some(cached) = slot.as_ref() {
            match cached.client.database("admin").run_command(doc! { "ping": 1 }).await {
                Ok(_) => return Ok(cached.database.clone()),
                Err(e) => {
                    tracing::debug!(error = %e, "document store ping failed, reconnecting")
                }
            }
        }
        // Still occupied only when the ping above failed.
        if slot.take().is_some() {
            self.reconnects.fetch_add(1, Ordering::Relaxed);
        }

        let client = mongodb::Client::with_uri_str(self.document_config.connection_uri())
            .await
            .context("Failed to create document store client")?;
        let database = client.database(&self.document_config.database);
        tracing::debug!(database = %self.document_config.database, "document store client created");

        *slot = Some(DocumentSlot {
            client,
            database: database.clone(),
        });
        Ok(database)
    }

    /// Handles replaced because their ping failed.
    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::Relaxed)
    }

    async fn ping_relational(&self, conn: &mut AnyConnection) -> Result<(), sqlx::Error> {
        #[cfg(test)]
        if self.fail_next_ping.swap(false, Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("connection lost".to_string()));
        }
        conn.ping().await
    }

    /// Name of the collection holding query-log entries.
    pub fn log_collection(&self) -> &str {
        &self.document_config.collection
    }

    /// Close both cached handles. Safe to call repeatedly.
    pub async fn release_all(&self) {
        if let Some(slot) = self.document.lock().await.take() {
            slot.client.shutdown().await;
            tracing::debug!("document store client closed");
        }
        if let Some(conn) = self.relational.lock().await.take() {
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "relational connection closed uncleanly");
            }
        }
    }
}

async fn connect_relational(config: &RelationalConfig) -> Result<AnyConnection> {
    let url = config.connection_url();
    let conn = AnyConnection::connect(&url)
        .await
        .context("Failed to connect to the film catalog")?;
    tracing::debug!(backend = conn.backend_name(), "relational connection established");
    Ok(conn)
}
