use serde::{Deserialize, Serialize};

/// Tunable thresholds for the weekly trend view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendConfig {
    /// Number of most recent dates kept in the daily series
    pub window_days: usize,

    /// Days with fewer samples than this report no value
    pub min_daily_samples: usize,

    /// |last - first| at or beyond this is a trend, not noise
    pub change_threshold: i32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            min_daily_samples: 3,
            change_threshold: 15,
        }
    }
}
