//! Shared application state and the pure functions that rebuild it.
//!
//! `AppState` is never edited in place. Every change computes a new value and
//! swaps it into the `StateCell` in one critical section, so observers always
//! see a complete snapshot.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::models::{CacheRecord, Reading, Zone};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub zones: Vec<Zone>,
    /// Latest reading per zone id; never two entries for one zone.
    pub all_readings: Vec<Reading>,
    /// Always `all_readings` filtered by `pinned_ids`.
    pub pinned_readings: Vec<Reading>,
    pub pinned_ids: BTreeSet<String>,
}

impl AppState {
    /// Cold-start state: whatever the cache held, nothing loading, no error.
    pub fn from_cache(record: Option<CacheRecord>, pinned_ids: BTreeSet<String>) -> Self {
        let (zones, readings) = match record {
            Some(record) => (record.zones, record.all_readings),
            None => (Vec::new(), Vec::new()),
        };

        let all_readings = merge_readings(readings, std::iter::empty());
        Self {
            is_loading: false,
            error: None,
            zones,
            pinned_readings: filter_pinned(&all_readings, &pinned_ids),
            all_readings,
            pinned_ids,
        }
    }

    /// Replace the reading set, keeping the pinned view in step.
    pub fn with_readings(&self, all_readings: Vec<Reading>) -> Self {
        Self {
            pinned_readings: filter_pinned(&all_readings, &self.pinned_ids),
            all_readings,
            ..self.clone()
        }
    }

    /// Replace the pin set, keeping the pinned view in step.
    pub fn with_pinned_ids(&self, pinned_ids: BTreeSet<String>) -> Self {
        Self {
            pinned_readings: filter_pinned(&self.all_readings, &pinned_ids),
            pinned_ids,
            ..self.clone()
        }
    }

    pub fn is_pinned(&self, zone_id: &str) -> bool {
        self.pinned_ids.contains(zone_id)
    }

    pub fn reading_for(&self, zone_id: &str) -> Option<&Reading> {
        self.all_readings.iter().find(|r| r.zone_id == zone_id)
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    /// Zones whose name, id or provider contain `query`, ignoring case.
    /// A blank query matches everything.
    pub fn search_zones(&self, query: &str) -> Vec<&Zone> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.zones.iter().collect();
        }
        self.zones.iter().filter(|z| z.matches(&needle)).collect()
    }
}

pub fn filter_pinned(readings: &[Reading], pinned_ids: &BTreeSet<String>) -> Vec<Reading> {
    readings
        .iter()
        .filter(|r| pinned_ids.contains(&r.zone_id))
        .cloned()
        .collect()
}

/// Union keyed by zone id. `fresh` wins over `leftovers`, and within each
/// input the first entry for a zone wins. Order is `fresh` then `leftovers`.
pub fn merge_readings<I>(fresh: Vec<Reading>, leftovers: I) -> Vec<Reading>
where
    I: IntoIterator<Item = Reading>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(fresh.len());

    for reading in fresh.into_iter().chain(leftovers) {
        if seen.insert(reading.zone_id.clone()) {
            merged.push(reading);
        }
    }

    merged
}

/// Split zone ids by pin membership, keeping directory order.
pub fn partition_zones(zones: &[Zone], pinned_ids: &BTreeSet<String>) -> (Vec<String>, Vec<String>) {
    zones
        .iter()
        .map(|z| z.id.clone())
        .partition(|id| pinned_ids.contains(id))
}

/// Current snapshot plus `publish(new snapshot)`.
///
/// Backed by a watch channel so any number of observers can follow along;
/// slow observers only ever see the latest value.
pub struct StateCell {
    tx: watch::Sender<Arc<AppState>>,
}

impl StateCell {
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.tx.subscribe()
    }

    /// Compute the next state from the current one and swap it in while
    /// holding the channel's write lock. Returns what was published.
    pub fn publish<F>(&self, update: F) -> Arc<AppState>
    where
        F: FnOnce(&AppState) -> AppState,
    {
        let mut published = self.snapshot();
        self.tx.send_modify(|current| {
            let next = Arc::new(update(current));
            published = Arc::clone(&next);
            *current = next;
        });
        published
    }
}
