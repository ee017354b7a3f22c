use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::CacheStore;
use crate::error::SyncError;
use crate::models::CacheRecord;
use crate::remote::{ReadingFetcher, ZoneDirectory};

use super::fetch::{fetch_readings, until_cancelled};
use super::state::{merge_readings, partition_zones, AppState, StateCell};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// User asked for it; failures are shown.
    Manual,
    /// Fired by the polling scheduler; failures stay quiet.
    Automatic,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTrigger::Manual => "manual",
            RefreshTrigger::Automatic => "automatic",
        }
    }

    fn is_manual(&self) -> bool {
        matches!(self, RefreshTrigger::Manual)
    }
}

/// What a finished cycle did.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: String,
    pub trigger: RefreshTrigger,
    pub zones: usize,
    pub pinned_fetched: usize,
    pub unpinned_fetched: usize,
    pub failed_zone_ids: Vec<String>,
    /// Background cache write. Failures inside it are only logged.
    pub cache_write: JoinHandle<()>,
}

pub struct SyncEngine {
    directory: Arc<dyn ZoneDirectory>,
    fetcher: Arc<dyn ReadingFetcher>,
    store: Arc<dyn CacheStore>,
    state: Arc<StateCell>,
}

impl SyncEngine {
    pub fn new(
        directory: Arc<dyn ZoneDirectory>,
        fetcher: Arc<dyn ReadingFetcher>,
        store: Arc<dyn CacheStore>,
        state: Arc<StateCell>,
    ) -> Self {
        Self {
            directory,
            fetcher,
            store,
            state,
        }
    }

    pub fn state(&self) -> &Arc<StateCell> {
        &self.state
    }

    /// Run one refresh cycle: directory, pinned readings, unpinned readings,
    /// then a background cache write.
    ///
    /// Publishes up to four times (loading, zones, pinned merge, final merge).
    /// When `cancel` fires, outstanding fetches are aborted and nothing further
    /// is published; earlier publishes stay visible.
    pub async fn refresh(
        &self,
        trigger: RefreshTrigger,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let cycle_id = new_cycle_id();
        log_info!("[{cycle_id}] {} refresh started", trigger.as_str());

        if trigger.is_manual() {
            self.state.publish(|current| AppState {
                is_loading: true,
                error: None,
                ..current.clone()
            });
        }

        let fetched = until_cancelled(cancel, self.directory.fetch_zones())
            .await
            .inspect_err(|_| log_info!("[{cycle_id}] cancelled during directory fetch"))?;

        let zones = match fetched {
            Ok(zones) => zones,
            Err(source) => {
                let err = SyncError::DirectoryFetch(source);
                if trigger.is_manual() {
                    log_error!("[{cycle_id}] {err}");
                    let message = err.user_message();
                    self.state.publish(|current| AppState {
                        is_loading: false,
                        error: Some(message),
                        ..current.clone()
                    });
                } else {
                    log_warn!("[{cycle_id}] {err}; keeping previous data");
                }
                return Err(err);
            }
        };

        let published = self.state.publish(|current| AppState {
            zones: zones.clone(),
            ..current.clone()
        });

        let (pinned_ids, unpinned_ids) = partition_zones(&zones, &published.pinned_ids);
        log_info!(
            "[{cycle_id}] {} zones ({} pinned, {} unpinned)",
            zones.len(),
            pinned_ids.len(),
            unpinned_ids.len()
        );

        let pinned = fetch_readings(&self.fetcher, &pinned_ids, cancel, &cycle_id)
            .await
            .inspect_err(|_| log_info!("[{cycle_id}] cancelled during pinned fetch"))?;

        let unpinned_set: HashSet<&str> = unpinned_ids.iter().map(String::as_str).collect();
        self.state.publish(|current| {
            let leftovers = current
                .all_readings
                .iter()
                .filter(|r| unpinned_set.contains(r.zone_id.as_str()))
                .cloned();
            current.with_readings(merge_readings(pinned.readings.clone(), leftovers))
        });
        log_debug!(
            "[{cycle_id}] published {} pinned readings",
            pinned.readings.len()
        );

        let unpinned = fetch_readings(&self.fetcher, &unpinned_ids, cancel, &cycle_id)
            .await
            .inspect_err(|_| log_info!("[{cycle_id}] cancelled during unpinned fetch"))?;

        let pinned_fetched = pinned.readings.len();
        let unpinned_fetched = unpinned.readings.len();
        let all_readings = merge_readings(pinned.readings, unpinned.readings);

        self.state.publish(|current| AppState {
            is_loading: false,
            ..current.with_readings(all_readings.clone())
        });

        let mut failed_zone_ids = pinned.failed;
        failed_zone_ids.extend(unpinned.failed);
        log_info!(
            "[{cycle_id}] refresh finished: {} readings, {} zones without data",
            all_readings.len(),
            failed_zone_ids.len()
        );

        let cache_write = self.spawn_cache_write(&cycle_id, CacheRecord::new(zones, all_readings));

        Ok(CycleReport {
            cycle_id,
            trigger,
            zones: published.zones.len(),
            pinned_fetched,
            unpinned_fetched,
            failed_zone_ids,
            cache_write,
        })
    }

    fn spawn_cache_write(&self, cycle_id: &str, record: CacheRecord) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let cycle_id = cycle_id.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(source) = store.save_cache_record(&record) {
                let err = SyncError::CacheIo(source);
                log_error!("[{cycle_id}] {err}");
            }
        })
    }
}

fn new_cycle_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}
