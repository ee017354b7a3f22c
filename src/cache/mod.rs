//! Durable snapshot and preference storage.
//!
//! Two independent records live here: the last merged `CacheRecord` and the
//! user's `Preferences`. Both are JSON over a plain key-value store, which can
//! be the SQLite `Database` or the in-process `MemoryStore`.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{CacheRecord, Preferences};

const CACHE_RECORD_KEY: &str = "cache_record";
const PREFERENCES_KEY: &str = "preferences";

/// Get/set of opaque byte strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Storage boundary the engine talks to. All calls are blocking local I/O.
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` when nothing usable is stored.
    fn load_cache_record(&self) -> Result<Option<CacheRecord>>;
    fn save_cache_record(&self, record: &CacheRecord) -> Result<()>;
    /// Defaults when nothing usable is stored.
    fn load_preferences(&self) -> Result<Preferences>;
    fn save_preferences(&self, preferences: &Preferences) -> Result<()>;
}

pub struct KvCacheStore<S> {
    store: S,
}

impl<S: KeyValueStore> KvCacheStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self
            .store
            .get(key)
            .with_context(|| format!("failed to read {key}"))?
        else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("Ignoring malformed {key} ({} bytes): {err}", bytes.len());
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec(value).with_context(|| format!("failed to encode {key}"))?;
        self.store
            .set(key, &bytes)
            .with_context(|| format!("failed to write {key}"))
    }
}

impl<S: KeyValueStore> CacheStore for KvCacheStore<S> {
    fn load_cache_record(&self) -> Result<Option<CacheRecord>> {
        self.read_json(CACHE_RECORD_KEY)
    }

    fn save_cache_record(&self, record: &CacheRecord) -> Result<()> {
        self.write_json(CACHE_RECORD_KEY, record)
    }

    fn load_preferences(&self) -> Result<Preferences> {
        Ok(self.read_json(PREFERENCES_KEY)?.unwrap_or_default())
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.write_json(PREFERENCES_KEY, preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{Reading, Zone};
    use std::collections::{BTreeMap, BTreeSet};

    fn sample_record() -> CacheRecord {
        CacheRecord::new(
            vec![Zone {
                id: "srinagar".into(),
                name: "Srinagar".into(),
                provider: "Open-Meteo".into(),
                lat: 34.08,
                lon: 74.79,
            }],
            vec![Reading {
                zone_id: "srinagar".into(),
                zone_name: Some("Srinagar".into()),
                timestamp: "2024-11-02T08:00:00Z".into(),
                us_aqi: Some(152),
                n_aqi: Some(118),
                main_pollutant: Some("pm2_5".into()),
                concentrations: BTreeMap::from([("pm2_5".to_string(), 57.3)]),
                breakdown: BTreeMap::from([("pm2_5".to_string(), 118)]),
                trend: None,
            }],
        )
    }

    #[test]
    fn empty_store_yields_defaults() {
        let store = KvCacheStore::new(MemoryStore::new());
        assert!(store.load_cache_record().unwrap().is_none());
        assert_eq!(store.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn cache_record_round_trips_through_sqlite() {
        let store = KvCacheStore::new(Database::in_memory().unwrap());
        let record = sample_record();
        store.save_cache_record(&record).unwrap();
        assert_eq!(store.load_cache_record().unwrap(), Some(record));
    }

    #[test]
    fn preferences_are_independent_of_cache_record() {
        let store = KvCacheStore::new(MemoryStore::new());
        let prefs = Preferences {
            pinned_ids: BTreeSet::from(["srinagar".to_string()]),
            use_us_aqi: true,
        };
        store.save_preferences(&prefs).unwrap();

        assert!(store.load_cache_record().unwrap().is_none());
        assert_eq!(store.load_preferences().unwrap(), prefs);
    }

    #[test]
    fn malformed_bytes_read_as_absent() {
        let kv = MemoryStore::new();
        kv.set(CACHE_RECORD_KEY, b"{not json").unwrap();
        kv.set(PREFERENCES_KEY, b"[1,2,3]").unwrap();

        let store = KvCacheStore::new(kv);
        assert!(store.load_cache_record().unwrap().is_none());
        assert_eq!(store.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn storage_failures_surface_as_errors() {
        let kv = MemoryStore::new();
        kv.fail_writes(true);
        let store = KvCacheStore::new(kv);
        let err = store.save_cache_record(&sample_record()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write cache_record"));
    }
}
