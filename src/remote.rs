//! Remote collaborators. The HTTP transport lives outside this crate; the
//! engine only sees these two traits.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Reading, Zone};

#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    async fn fetch_zones(&self) -> Result<Vec<Zone>>;
}

#[async_trait]
pub trait ReadingFetcher: Send + Sync {
    /// Timeouts, if any, are the implementation's business.
    async fn fetch_reading(&self, zone_id: &str) -> Result<Reading>;
}
