//! Air quality reading data model.
//!
//! A `Reading` is the latest known snapshot for one zone. The engine never
//! keeps more than one per zone; history for trend purposes is handed in by
//! the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which index a user reads values in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AqiStandard {
    /// National AQI (`nAqi`).
    #[default]
    National,
    /// US EPA AQI (`usAqi`).
    Us,
}

impl AqiStandard {
    pub fn from_use_us_aqi(use_us_aqi: bool) -> Self {
        if use_us_aqi {
            AqiStandard::Us
        } else {
            AqiStandard::National
        }
    }

    pub fn is_us(&self) -> bool {
        matches!(self, AqiStandard::Us)
    }

    pub fn toggled(&self) -> Self {
        match self {
            AqiStandard::National => AqiStandard::Us,
            AqiStandard::Us => AqiStandard::National,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiStandard::National => "NAQI",
            AqiStandard::Us => "US AQI",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingTrend {
    #[serde(default)]
    pub change1h: Option<i32>,
}

impl ReadingTrend {
    pub fn direction(&self) -> ChangeDirection {
        match self.change1h {
            Some(delta) if delta > 0 => ChangeDirection::Rising,
            Some(delta) if delta < 0 => ChangeDirection::Falling,
            _ => ChangeDirection::Flat,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub zone_id: String,
    #[serde(default)]
    pub zone_name: Option<String>,
    /// ISO-8601-like; the first 10 characters are the calendar date.
    pub timestamp: String,
    #[serde(default)]
    pub us_aqi: Option<i32>,
    #[serde(default)]
    pub n_aqi: Option<i32>,
    #[serde(default)]
    pub main_pollutant: Option<String>,
    /// Raw concentrations in µg/m³, keyed by pollutant.
    #[serde(default)]
    pub concentrations: BTreeMap<String, f64>,
    /// Per-pollutant sub-index.
    #[serde(default)]
    pub breakdown: BTreeMap<String, i32>,
    #[serde(default)]
    pub trend: Option<ReadingTrend>,
}

impl Reading {
    pub fn aqi(&self, standard: AqiStandard) -> Option<i32> {
        match standard {
            AqiStandard::Us => self.us_aqi,
            AqiStandard::National => self.n_aqi,
        }
    }

    /// Calendar date portion of `timestamp` (`yyyy-mm-dd`).
    pub fn date_key(&self) -> String {
        self.timestamp.chars().take(10).collect()
    }

    pub fn hourly_change(&self) -> Option<i32> {
        self.trend.as_ref().and_then(|trend| trend.change1h)
    }

    pub fn change_direction(&self) -> ChangeDirection {
        self.trend
            .as_ref()
            .map(ReadingTrend::direction)
            .unwrap_or(ChangeDirection::Flat)
    }
}
