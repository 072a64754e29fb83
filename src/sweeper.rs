//! Background cleanup task
//!
//! Runs the store's sweep on a fixed interval so expired builds leave the
//! data file even when nobody reads them. Reads evict on their own, the
//! sweep only bounds how long dead records linger on disk.

use crate::store::RecordStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Handle to the running sweeper
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct Sweeper {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweep loop on the current runtime
    ///
    /// Ticks at the store's sweep interval, so the schedule reported in
    /// stats is the one actually running. The first tick fires immediately,
    /// which doubles as the startup cleanup.
    pub fn start(store: Arc<RecordStore>) -> Self {
        let interval = store.sweep_interval();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(sweep_loop(store, interval, cancel.clone()));

        info!("Periodic cleanup scheduled every {:?}", interval);

        Sweeper {
            cancel,
            handle: Some(handle),
        }
    }

    /// Signal the task to stop
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Sweeper task ended abnormally: {}", e);
            }
        }
        info!("Periodic cleanup stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop(store: Arc<RecordStore>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Sweeper received shutdown signal");
                return;
            }
            _ = ticker.tick() => {
                let live = store.sweep().await;
                debug!("Sweep complete, {} live records", live);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock;
    use crate::config::Config;
    use serde_json::json;

    fn store_in(dir: &tempfile::TempDir, sweep_interval: Duration) -> Arc<RecordStore> {
        Arc::new(RecordStore::new(&Config {
            data_file: dir.path().join("data.json"),
            record_lifetime: Duration::from_secs(60),
            sweep_interval,
            ..Config::default()
        }))
    }

    fn build() -> crate::store::Payload {
        match json!({
            "name": "n",
            "className": "rogue",
            "assignedPoints": 1,
            "totalPoints": 51,
            "availablePoints": 50
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_sweeper_purges_expired_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Duration::from_millis(20));

        let stale = store
            .insert_at(build(), clock::now_millis() - 120_000)
            .await
            .unwrap();
        let fresh = store.insert(build()).await.unwrap();

        let sweeper = Sweeper::start(store.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.shutdown().await;

        let on_disk = store.file().load().await;
        assert!(!on_disk.contains_key(&stale.id));
        assert!(on_disk.contains_key(&fresh.id));
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Duration::from_millis(10));

        let mut sweeper = Sweeper::start(store);
        sweeper.stop();

        let handle = sweeper.handle.take().unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_moves_next_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Duration::from_secs(3600));

        let sweeper = Sweeper::start(store.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        let before = clock::now_millis();
        let stats = store.stats().await;
        sweeper.shutdown().await;

        // the immediate first tick ran, so the next one is about an hour out
        assert!(stats.next_cleanup <= before + 3_600_000);
        assert!(stats.next_cleanup > before + 3_500_000);
    }
}
