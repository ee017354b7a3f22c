//! Scriptable collaborators for engine, pin and polling tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::models::{Reading, Zone};
use crate::remote::{ReadingFetcher, ZoneDirectory};
use crate::widget::WidgetNotifier;

const RELEASE_PERMITS: usize = 1024;

pub(crate) fn zone(id: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: id.to_uppercase(),
        provider: "test".to_string(),
        lat: 0.0,
        lon: 0.0,
    }
}

pub(crate) fn reading(zone_id: &str, aqi: i32) -> Reading {
    Reading {
        zone_id: zone_id.to_string(),
        zone_name: Some(zone_id.to_uppercase()),
        timestamp: "2024-11-02T08:00:00Z".to_string(),
        us_aqi: Some(aqi),
        n_aqi: Some(aqi),
        main_pollutant: Some("pm2_5".to_string()),
        concentrations: Default::default(),
        breakdown: Default::default(),
        trend: None,
    }
}

pub(crate) async fn yield_until(mut done: impl FnMut() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}

pub(crate) struct FakeDirectory {
    zones: Mutex<Vec<Zone>>,
    fail: AtomicBool,
    hold: AtomicBool,
    gate: Semaphore,
    calls: AtomicUsize,
    finished: AtomicUsize,
}

impl FakeDirectory {
    pub(crate) fn new(zones: Vec<Zone>) -> Self {
        Self {
            zones: Mutex::new(zones),
            fail: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_zones(&self, zones: Vec<Zone>) {
        *self.zones.lock().unwrap() = zones;
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Park every call until `release` is called.
    pub(crate) fn hold(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.gate.add_permits(RELEASE_PERMITS);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneDirectory for FakeDirectory {
    async fn fetch_zones(&self) -> Result<Vec<Zone>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            let _permit = self.gate.acquire().await?;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            bail!("directory unavailable");
        }
        Ok(self.zones.lock().unwrap().clone())
    }
}

/// Counts a held fetch that was dropped before it returned.
struct AbortGuard<'a> {
    aborted: &'a AtomicUsize,
    armed: bool,
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub(crate) struct FakeFetcher {
    readings: Mutex<HashMap<String, Reading>>,
    failing: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    held: Mutex<HashSet<String>>,
    gate: Semaphore,
    calls: AtomicUsize,
    completed: AtomicUsize,
    waiting: AtomicUsize,
    aborted: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self {
            readings: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            panicking: Mutex::new(HashSet::new()),
            held: Mutex::new(HashSet::new()),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            waiting: AtomicUsize::new(0),
            aborted: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_readings(readings: Vec<Reading>) -> Self {
        let fake = Self::new();
        for r in readings {
            fake.set_reading(r);
        }
        fake
    }

    pub(crate) fn set_reading(&self, reading: Reading) {
        self.readings
            .lock()
            .unwrap()
            .insert(reading.zone_id.clone(), reading);
    }

    pub(crate) fn fail_zone(&self, zone_id: &str) {
        self.failing.lock().unwrap().insert(zone_id.to_string());
    }

    pub(crate) fn panic_zone(&self, zone_id: &str) {
        self.panicking.lock().unwrap().insert(zone_id.to_string());
    }

    /// Park the next fetch for `zone_id` until `release` is called. Later
    /// fetches for the same zone go straight through.
    pub(crate) fn hold_zone(&self, zone_id: &str) {
        self.held.lock().unwrap().insert(zone_id.to_string());
    }

    pub(crate) fn release(&self) {
        self.held.lock().unwrap().clear();
        self.gate.add_permits(RELEASE_PERMITS);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_until_held(&self, count: usize) {
        yield_until(|| self.waiting.load(Ordering::SeqCst) >= count).await
    }

    pub(crate) async fn wait_until_aborted(&self, count: usize) {
        yield_until(|| self.aborted.load(Ordering::SeqCst) >= count).await
    }
}

#[async_trait]
impl ReadingFetcher for FakeFetcher {
    async fn fetch_reading(&self, zone_id: &str) -> Result<Reading> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.panicking.lock().unwrap().contains(zone_id) {
            panic!("fetcher blew up for {zone_id}");
        }

        let held = self.held.lock().unwrap().remove(zone_id);
        if held {
            let mut guard = AbortGuard {
                aborted: &self.aborted,
                armed: true,
            };
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await?;
            guard.armed = false;
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(zone_id) {
            bail!("reading unavailable for {zone_id}");
        }
        self.readings
            .lock()
            .unwrap()
            .get(zone_id)
            .cloned()
            .ok_or_else(|| anyhow!("no reading scripted for {zone_id}"))
    }
}

/// Widget notifier that counts its signals.
pub(crate) fn counting_notifier() -> (Arc<dyn WidgetNotifier>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let notifier: Arc<dyn WidgetNotifier> = Arc::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (notifier, count)
}
