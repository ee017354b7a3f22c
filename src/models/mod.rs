pub mod cache_record;
pub mod reading;
pub mod zone;

pub use cache_record::{CacheRecord, Preferences};
pub use reading::{AqiStandard, ChangeDirection, Reading, ReadingTrend};
pub use zone::Zone;

use serde::{Deserialize, Serialize};

/// One day of the weekly series. `aqi` is `None` when the day had too few samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAqi {
    pub date: String,
    pub aqi: Option<i32>,
}
