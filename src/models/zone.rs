use serde::{Deserialize, Serialize};

/// A monitorable location as listed by the zone directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub lat: f64,
    pub lon: f64,
}

impl Zone {
    /// Case-insensitive match against name, id and provider.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.id.to_lowercase().contains(needle_lowercase)
            || self.provider.to_lowercase().contains(needle_lowercase)
    }
}
