//! File-backed dispatch ledger
//!
//! The ledger document maps event id to the instant its wish was recorded.
//! The full map lives in memory between persists; `reload` re-reads the
//! document at the start of every cycle.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use wishbot_core::{DispatchLedger, RecordOutcome};
use wishbot_domain::{LedgerRecord, Result};

use super::document::DocumentStore;

/// Durable set of already-notified event ids
pub struct FileDispatchLedger {
    store: DocumentStore,
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl FileDispatchLedger {
    /// Create a ledger over the given document path. The map starts empty;
    /// the engine reloads it at cycle start.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { store: DocumentStore::new(path), entries: RwLock::new(HashMap::new()) }
    }

    /// Snapshot of all records, unordered.
    pub async fn records(&self) -> Vec<LedgerRecord> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(event_id, sent_at)| LedgerRecord {
                event_id: event_id.clone(),
                sent_at: *sent_at,
            })
            .collect()
    }
}

#[async_trait]
impl DispatchLedger for FileDispatchLedger {
    async fn reload(&self) -> Result<()> {
        let loaded: HashMap<String, DateTime<Utc>> = self.store.load_or_default()?;
        debug!(count = loaded.len(), path = %self.store.path().display(), "ledger reloaded");
        *self.entries.write().await = loaded;
        Ok(())
    }

    async fn contains(&self, event_id: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(event_id))
    }

    async fn record(&self, event_id: &str, sent_at: DateTime<Utc>) -> Result<RecordOutcome> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(event_id) {
            return Ok(RecordOutcome::AlreadyPresent);
        }

        entries.insert(event_id.to_string(), sent_at);
        if let Err(err) = self.store.write(&*entries) {
            // Keep memory consistent with disk when the persist fails.
            entries.remove(event_id);
            return Err(err);
        }

        Ok(RecordOutcome::Recorded)
    }
}
