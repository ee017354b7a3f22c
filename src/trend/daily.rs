use std::collections::BTreeMap;

use crate::models::{AqiStandard, DailyAqi, Reading};
use crate::trend::config::TrendConfig;

/// Group `history` for `zone_id` by calendar date and emit one median per day
/// for the most recent `window_days` dates, oldest first.
pub fn build_daily_trend(
    zone_id: &str,
    history: &[Reading],
    standard: AqiStandard,
    config: &TrendConfig,
) -> Vec<DailyAqi> {
    // BTreeMap keeps yyyy-mm-dd keys in ascending order
    let mut by_date: BTreeMap<String, Vec<&Reading>> = BTreeMap::new();
    for reading in history.iter().filter(|r| r.zone_id == zone_id) {
        by_date.entry(reading.date_key()).or_default().push(reading);
    }

    let skip = by_date.len().saturating_sub(config.window_days);

    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, readings)| {
            let values: Vec<i32> = readings
                .iter()
                .filter_map(|r| r.aqi(standard))
                .collect();

            let aqi = if values.len() < config.min_daily_samples {
                None
            } else {
                upper_median(values)
            };

            DailyAqi { date, aqi }
        })
        .collect()
}

/// Element at index `n / 2` after sorting; the upper middle for even counts.
pub fn upper_median(mut values: Vec<i32>) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[values.len() / 2])
}
