//! Time-to-live record store
//!
//! Every operation reloads the mapping from the data file and, if it changes
//! anything, writes the whole mapping back. All cycles run under one async
//! mutex so a sweep can never overwrite a concurrent insert.

use super::file::{FileStore, RecordMap};
use super::record::{self, Payload, Record};
use crate::clock;
use crate::config::Config;
use crate::error::{Result, StoreError};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Statistics about the stored records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Records in the file, expired or not
    pub total: usize,
    /// Records younger than the lifetime
    pub active: usize,
    /// Records whose remaining time is positive and under the threshold
    pub expiring_soon: usize,
    /// Configured record lifetime
    pub record_lifetime: Duration,
    /// Next scheduled sweep, epoch milliseconds
    pub next_cleanup: i64,
}

/// Mutable bookkeeping guarded together with the file
#[derive(Debug, Default)]
struct SweepState {
    last_sweep: Option<i64>,
}

/// File-backed record store with age-based eviction
pub struct RecordStore {
    file: FileStore,
    lifetime: Duration,
    sweep_interval: Duration,
    expiring_soon: Duration,
    guard: Mutex<SweepState>,
}

impl RecordStore {
    /// Create a store from the service configuration
    pub fn new(config: &Config) -> Self {
        RecordStore {
            file: FileStore::new(&config.data_file),
            lifetime: config.record_lifetime,
            sweep_interval: config.sweep_interval,
            expiring_soon: config.expiring_soon,
            guard: Mutex::new(SweepState::default()),
        }
    }

    /// Configured record lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Interval the periodic sweep runs at
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Backing file
    pub fn file(&self) -> &FileStore {
        &self.file
    }

    /// Create the data file if it does not exist yet
    pub async fn ensure_file(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        let exists = tokio::fs::try_exists(self.file.path()).await.map_err(|e| {
            error!(
                "Cannot check data file {}: {}",
                self.file.path().display(),
                e
            );
            StoreError::Persistence(format!(
                "failed to check data file {}: {}",
                self.file.path().display(),
                e
            ))
        })?;
        if exists {
            return Ok(());
        }
        self.file.save(&RecordMap::new()).await?;
        info!("Data file created: {}", self.file.path().display());
        Ok(())
    }

    /// Load the raw mapping, expired records included
    pub async fn load(&self) -> RecordMap {
        let _guard = self.guard.lock().await;
        self.file.load().await
    }

    /// Remove records that reached the lifetime, as of now
    pub async fn evict(&self) -> RecordMap {
        self.evict_at(clock::now_millis()).await
    }

    /// Remove records that reached the lifetime at `now`
    ///
    /// Returns the surviving records. The file is only rewritten when
    /// something was dropped; a failed rewrite is logged and the survivors
    /// are still returned.
    pub async fn evict_at(&self, now: i64) -> RecordMap {
        let _guard = self.guard.lock().await;
        self.evict_locked(now).await
    }

    /// Periodic sweep: evict and remember when it ran
    pub async fn sweep_at(&self, now: i64) -> usize {
        let mut guard = self.guard.lock().await;
        let kept = self.evict_locked(now).await;
        guard.last_sweep = Some(now);
        kept.len()
    }

    /// Periodic sweep as of now
    pub async fn sweep(&self) -> usize {
        self.sweep_at(clock::now_millis()).await
    }

    /// Validate and store a new build
    pub async fn insert(&self, payload: Payload) -> Result<Record> {
        self.insert_at(payload, clock::now_millis()).await
    }

    /// Validate and store a new build created at `now`
    pub async fn insert_at(&self, payload: Payload, now: i64) -> Result<Record> {
        record::validate(&payload)?;

        let id = uuid::Uuid::new_v4().to_string();
        let record = Record::new(id.clone(), payload, now, self.lifetime_ms());

        let _guard = self.guard.lock().await;
        let mut records = self.file.load().await;
        records.insert(id.clone(), record.clone());
        self.file.save(&records).await?;

        info!("Stored build {} ({} records on file)", id, records.len());
        Ok(record)
    }

    /// Fetch a live record by id
    pub async fn get(&self, id: &str) -> Result<Record> {
        self.get_at(id, clock::now_millis()).await
    }

    /// Fetch a record by id as of `now`; expired records are not found
    pub async fn get_at(&self, id: &str, now: i64) -> Result<Record> {
        let mut records = self.evict_at(now).await;
        records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// List live records in insertion order
    pub async fn list(&self) -> Vec<Record> {
        self.list_at(clock::now_millis()).await
    }

    /// List records alive at `now`, oldest first
    pub async fn list_at(&self, now: i64) -> Vec<Record> {
        let mut records: Vec<Record> = self.evict_at(now).await.into_values().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    /// Compute statistics without evicting
    pub async fn stats(&self) -> StoreStats {
        self.stats_at(clock::now_millis()).await
    }

    /// Compute statistics at `now` over the raw file contents
    pub async fn stats_at(&self, now: i64) -> StoreStats {
        let guard = self.guard.lock().await;
        let records = self.file.load().await;

        let lifetime_ms = self.lifetime_ms();
        let soon_ms = clock::duration_millis(self.expiring_soon);

        let active = records
            .values()
            .filter(|r| !r.is_expired(now, lifetime_ms))
            .count();

        let expiring_soon = records
            .values()
            .filter(|r| {
                let left = r.time_left(now);
                left > 0 && left < soon_ms
            })
            .count();

        let interval_ms = clock::duration_millis(self.sweep_interval);
        let next_cleanup = guard.last_sweep.unwrap_or(now).saturating_add(interval_ms);

        StoreStats {
            total: records.len(),
            active,
            expiring_soon,
            record_lifetime: self.lifetime,
            next_cleanup,
        }
    }

    /// Evict while the caller holds the guard
    async fn evict_locked(&self, now: i64) -> RecordMap {
        let lifetime_ms = self.lifetime_ms();
        let (kept, dropped): (RecordMap, RecordMap) = self
            .file
            .load()
            .await
            .into_iter()
            .partition(|(_, r)| !r.is_expired(now, lifetime_ms));

        if dropped.is_empty() {
            debug!("Eviction found nothing to remove ({} live)", kept.len());
            return kept;
        }

        match self.file.save(&kept).await {
            Ok(()) => info!(
                "Cleanup removed {} expired records ({} remaining)",
                dropped.len(),
                kept.len()
            ),
            Err(e) => error!("Cleanup could not persist eviction: {}", e),
        }

        kept
    }

    fn lifetime_ms(&self) -> i64 {
        clock::duration_millis(self.lifetime)
    }
}
