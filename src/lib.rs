pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pins;
pub mod polling;
pub mod remote;
pub mod sync;
pub mod trend;
pub mod utils;
pub mod widget;

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use cache::{CacheStore, KeyValueStore, KvCacheStore, MemoryStore};
pub use config::EngineConfig;
pub use db::Database;
pub use error::SyncError;
pub use models::{AqiStandard, CacheRecord, DailyAqi, Preferences, Reading, Zone};
pub use pins::PinSetManager;
pub use polling::PollingController;
pub use remote::{ReadingFetcher, ZoneDirectory};
pub use sync::{AppState, CycleReport, RefreshTrigger, StateCell, SyncEngine};
pub use trend::{TrendLabel, TrendSnapshot};
pub use utils::logging::init_logging;
pub use widget::{NoopWidgetNotifier, WidgetNotifier};

/// One running instance of the engine: shared state, the refresh cycle, the
/// polling task and the user's preferences, all tied to one cancellation token.
pub struct AirQualitySession {
    engine: Arc<SyncEngine>,
    pins: PinSetManager,
    trend_tx: watch::Sender<Arc<TrendSnapshot>>,
    polling: Mutex<PollingController>,
    cancel_token: CancellationToken,
    config: EngineConfig,
}

impl AirQualitySession {
    /// Seed state from local storage. Makes no network call.
    ///
    /// Unreadable or malformed records are logged and treated as empty.
    pub fn open(
        directory: Arc<dyn ZoneDirectory>,
        fetcher: Arc<dyn ReadingFetcher>,
        store: Arc<dyn CacheStore>,
        notifier: Arc<dyn WidgetNotifier>,
        config: EngineConfig,
    ) -> Self {
        let preferences = store.load_preferences().unwrap_or_else(|source| {
            warn!("Starting without saved preferences: {}", SyncError::CacheIo(source));
            Preferences::default()
        });
        let record = store.load_cache_record().unwrap_or_else(|source| {
            warn!("Starting without cached readings: {}", SyncError::CacheIo(source));
            None
        });

        let initial = AppState::from_cache(record, preferences.pinned_ids.clone());
        info!(
            "Session opened with {} cached zones, {} readings, {} pinned",
            initial.zones.len(),
            initial.all_readings.len(),
            initial.pinned_ids.len()
        );

        let state = Arc::new(StateCell::new(initial));
        let engine = Arc::new(SyncEngine::new(
            directory,
            fetcher,
            Arc::clone(&store),
            Arc::clone(&state),
        ));
        let pins = PinSetManager::new(state, store, notifier, preferences.standard());
        let (trend_tx, _rx) = watch::channel(Arc::new(TrendSnapshot::default()));

        Self {
            engine,
            pins,
            trend_tx,
            polling: Mutex::new(PollingController::new()),
            cancel_token: CancellationToken::new(),
            config,
        }
    }

    /// Open against the SQLite file named in `config`, or an in-memory
    /// database when none is set.
    pub fn open_with_config(
        directory: Arc<dyn ZoneDirectory>,
        fetcher: Arc<dyn ReadingFetcher>,
        notifier: Arc<dyn WidgetNotifier>,
        config: EngineConfig,
    ) -> Result<Self> {
        let database = match &config.database_path {
            Some(path) => Database::new(path.clone())?,
            None => Database::in_memory()?,
        };
        let store: Arc<dyn CacheStore> = Arc::new(KvCacheStore::new(database));
        Ok(Self::open(directory, fetcher, store, notifier, config))
    }

    /// Kick off the cold-start refresh and begin polling.
    ///
    /// Fails if the session is already started. The returned handle resolves
    /// when the cold-start refresh is done.
    pub async fn start(&self) -> Result<JoinHandle<()>> {
        self.polling.lock().await.start_polling(
            Arc::clone(&self.engine),
            self.config.poll_interval(),
            &self.cancel_token,
        )?;

        let engine = Arc::clone(&self.engine);
        let token = self.cancel_token.child_token();
        Ok(tokio::spawn(async move {
            if let Err(err) = engine.refresh(RefreshTrigger::Manual, &token).await {
                warn!("Initial refresh did not complete: {err}");
            }
        }))
    }

    pub async fn refresh(&self, trigger: RefreshTrigger) -> Result<CycleReport, SyncError> {
        let token = self.cancel_token.child_token();
        self.engine.refresh(trigger, &token).await
    }

    pub fn toggle_pin(&self, zone_id: &str) -> bool {
        self.pins.toggle_pin(zone_id)
    }

    pub fn set_measurement_standard(&self, use_us_aqi: bool) -> AqiStandard {
        self.pins.set_measurement_standard(use_us_aqi)
    }

    pub fn toggle_measurement_standard(&self) -> AqiStandard {
        self.pins.toggle_measurement_standard()
    }

    pub fn measurement_standard(&self) -> AqiStandard {
        self.pins.standard()
    }

    /// Build the seven-day view for `zone_id` from caller-supplied history and
    /// publish it to trend subscribers.
    pub fn build_weekly_trend(&self, zone_id: &str, history: &[Reading]) -> Arc<TrendSnapshot> {
        let snapshot = Arc::new(TrendSnapshot::build(
            zone_id,
            history,
            self.pins.standard(),
            &self.config.trend,
        ));
        self.trend_tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        self.engine.state().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.engine.state().subscribe()
    }

    pub fn subscribe_standard(&self) -> watch::Receiver<AqiStandard> {
        self.pins.subscribe_standard()
    }

    pub fn subscribe_trend(&self) -> watch::Receiver<Arc<TrendSnapshot>> {
        self.trend_tx.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cancel everything this session started and wait for polling to stop.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down air quality session");
        self.cancel_token.cancel();
        self.polling.lock().await.stop_polling().await
    }
}
