//! User-owned state: the pin set and the measurement standard.
//!
//! Both live in one `Preferences` record, so every write re-reads the other
//! half under `write_lock` before saving.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error};
use tokio::sync::watch;

use crate::cache::CacheStore;
use crate::error::SyncError;
use crate::models::{AqiStandard, Preferences};
use crate::sync::StateCell;
use crate::widget::WidgetNotifier;

pub struct PinSetManager {
    state: Arc<StateCell>,
    store: Arc<dyn CacheStore>,
    notifier: Arc<dyn WidgetNotifier>,
    standard_tx: watch::Sender<AqiStandard>,
    write_lock: Mutex<()>,
}

impl PinSetManager {
    pub fn new(
        state: Arc<StateCell>,
        store: Arc<dyn CacheStore>,
        notifier: Arc<dyn WidgetNotifier>,
        standard: AqiStandard,
    ) -> Self {
        let (standard_tx, _rx) = watch::channel(standard);
        Self {
            state,
            store,
            notifier,
            standard_tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Flip `zone_id` in the pin set. Returns whether it is pinned afterwards.
    ///
    /// The new set is saved before it is published, then the widget is told.
    pub fn toggle_pin(&self, zone_id: &str) -> bool {
        let _guard = self.lock();

        let mut pinned_ids = self.state.snapshot().pinned_ids.clone();
        let now_pinned = if pinned_ids.remove(zone_id) {
            false
        } else {
            pinned_ids.insert(zone_id.to_string());
            true
        };

        self.persist(&pinned_ids, self.standard());
        self.state.publish(|current| current.with_pinned_ids(pinned_ids));
        debug!(
            "{} zone {zone_id}",
            if now_pinned { "Pinned" } else { "Unpinned" }
        );
        self.notifier.notify_pinned_changed();

        now_pinned
    }

    /// Choose US AQI (`true`) or the national index. Readings are untouched;
    /// consumers pick the field through `Reading::aqi`.
    pub fn set_measurement_standard(&self, use_us_aqi: bool) -> AqiStandard {
        self.update_standard(|_| AqiStandard::from_use_us_aqi(use_us_aqi))
    }

    pub fn toggle_measurement_standard(&self) -> AqiStandard {
        self.update_standard(|current| current.toggled())
    }

    pub fn standard(&self) -> AqiStandard {
        *self.standard_tx.borrow()
    }

    pub fn subscribe_standard(&self) -> watch::Receiver<AqiStandard> {
        self.standard_tx.subscribe()
    }

    fn update_standard<F>(&self, next: F) -> AqiStandard
    where
        F: FnOnce(AqiStandard) -> AqiStandard,
    {
        let _guard = self.lock();

        let standard = next(self.standard());
        self.persist(&self.state.snapshot().pinned_ids, standard);
        self.standard_tx.send_replace(standard);
        debug!("Measurement standard set to {}", standard.as_str());
        standard
    }

    fn persist(&self, pinned_ids: &BTreeSet<String>, standard: AqiStandard) {
        let preferences = Preferences {
            pinned_ids: pinned_ids.clone(),
            use_us_aqi: standard.is_us(),
        };
        if let Err(source) = self.store.save_preferences(&preferences) {
            error!("{}", SyncError::CacheIo(source));
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
