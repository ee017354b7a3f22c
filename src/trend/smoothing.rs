use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrendLabel {
    Improving,
    Worsening,
    Stable,
    InsufficientData,
}

impl TrendLabel {
    pub fn description(&self) -> &'static str {
        match self {
            TrendLabel::Improving => "Improving ↓",
            TrendLabel::Worsening => "Worsening ↑",
            TrendLabel::Stable => "Stable →",
            TrendLabel::InsufficientData => "Not enough data",
        }
    }
}

/// Three-point moving average that skips gaps.
///
/// Each output averages whatever non-null values exist at `i - 1`, `i` and
/// `i + 1`; it is `None` only when all three are missing.
pub fn smooth(values: &[Option<i32>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(values.len() - 1);
            let window: Vec<i32> = values[lo..=hi].iter().flatten().copied().collect();

            if window.is_empty() {
                None
            } else {
                let sum: i64 = window.iter().map(|v| i64::from(*v)).sum();
                Some(sum as f64 / window.len() as f64)
            }
        })
        .collect()
}

/// Label the series by comparing its first and last known values.
pub fn classify(values: &[Option<i32>], threshold: i32) -> TrendLabel {
    let clean: Vec<i32> = values.iter().flatten().copied().collect();
    let (Some(first), Some(last)) = (clean.first(), clean.last()) else {
        return TrendLabel::InsufficientData;
    };
    if clean.len() < 2 {
        return TrendLabel::InsufficientData;
    }

    // widened so extreme values and thresholds cannot overflow
    let delta = i64::from(*last) - i64::from(*first);
    let threshold = i64::from(threshold);
    if delta <= -threshold {
        TrendLabel::Improving
    } else if delta >= threshold {
        TrendLabel::Worsening
    } else {
        TrendLabel::Stable
    }
}
