pub mod config;
pub mod daily;
pub mod smoothing;

pub use config::TrendConfig;
pub use daily::build_daily_trend;
pub use smoothing::{classify, smooth, TrendLabel};

use serde::{Deserialize, Serialize};

use crate::models::{AqiStandard, DailyAqi, Reading};

/// Everything a trend chart needs for one zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendSnapshot {
    pub zone_id: String,
    pub daily: Vec<DailyAqi>,
    pub smoothed: Vec<Option<f64>>,
    pub label: Option<TrendLabel>,
}

impl TrendSnapshot {
    pub fn build(
        zone_id: &str,
        history: &[Reading],
        standard: AqiStandard,
        config: &TrendConfig,
    ) -> Self {
        let daily = build_daily_trend(zone_id, history, standard, config);
        let raw: Vec<Option<i32>> = daily.iter().map(|d| d.aqi).collect();

        Self {
            zone_id: zone_id.to_string(),
            smoothed: smooth(&raw),
            label: Some(classify(&raw, config.change_threshold)),
            daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn snapshot_combines_series_smoothing_and_label() {
        let mut history = Vec::new();
        for (d, v) in [(1, 40), (2, 50), (3, 70)] {
            for hour in 0..3 {
                history.push(Reading {
                    zone_id: "z".into(),
                    zone_name: None,
                    timestamp: format!("2024-06-{d:02}T{hour:02}:00:00Z"),
                    us_aqi: Some(v),
                    n_aqi: None,
                    main_pollutant: None,
                    concentrations: BTreeMap::new(),
                    breakdown: BTreeMap::new(),
                    trend: None,
                });
            }
        }

        let snapshot = TrendSnapshot::build("z", &history, AqiStandard::Us, &TrendConfig::default());

        assert_eq!(snapshot.daily.len(), 3);
        assert_eq!(snapshot.smoothed, vec![Some(45.0), Some(160.0 / 3.0), Some(60.0)]);
        assert_eq!(snapshot.label, Some(TrendLabel::Worsening));

        let national =
            TrendSnapshot::build("z", &history, AqiStandard::National, &TrendConfig::default());
        assert!(national.daily.iter().all(|d| d.aqi.is_none()));
        assert_eq!(national.label, Some(TrendLabel::InsufficientData));
    }
}
