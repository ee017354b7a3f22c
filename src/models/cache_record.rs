//! Durable records written by the cache store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AqiStandard, Reading, Zone};

/// Last successfully merged zone list and reading set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub zones: Vec<Zone>,
    pub all_readings: Vec<Reading>,
    /// Records written before this field existed decode as the oldest
    /// representable instant, so they never look fresh.
    #[serde(default = "unknown_saved_at")]
    pub saved_at: DateTime<Utc>,
}

fn unknown_saved_at() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

impl CacheRecord {
    pub fn new(zones: Vec<Zone>, all_readings: Vec<Reading>) -> Self {
        Self {
            zones,
            all_readings,
            saved_at: Utc::now(),
        }
    }
}

/// User preferences: the pin set and the measurement standard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub pinned_ids: BTreeSet<String>,
    #[serde(default)]
    pub use_us_aqi: bool,
}

impl Preferences {
    pub fn standard(&self) -> AqiStandard {
        AqiStandard::from_use_us_aqi(self.use_us_aqi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_timestamp_is_treated_as_stale() {
        let json = r#"{"zones":[],"allReadings":[]}"#;
        let record: CacheRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.saved_at, DateTime::<Utc>::MIN_UTC);
        assert!(record.saved_at < CacheRecord::new(vec![], vec![]).saved_at);
    }

    #[test]
    fn stored_timestamp_survives_decoding() {
        let json = r#"{"zones":[],"allReadings":[],"savedAt":"2024-03-01T08:30:00Z"}"#;
        let record: CacheRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.saved_at.to_rfc3339(), "2024-03-01T08:30:00+00:00");
    }
}
