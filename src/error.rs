//! Failure taxonomy for refresh cycles.
//!
//! Only `DirectoryFetch` on a manual cycle ever reaches the user, through
//! `AppState::error`. Everything else is logged and absorbed.
//!
//! The wrapped `anyhow` chain is rendered in full by `Display` and is not
//! exposed again through `source()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Whole-cycle failure: the zone list could not be fetched.
    #[error("failed to load zones: {0:#}")]
    DirectoryFetch(anyhow::Error),

    /// Per-zone failure; never escapes the fetch boundary.
    #[error("failed to fetch reading for zone {zone_id}: {cause:#}")]
    ReadingFetch { zone_id: String, cause: anyhow::Error },

    /// Cache read or write failure; log-only.
    #[error("cache i/o failed: {0:#}")]
    CacheIo(anyhow::Error),

    /// The owning session stopped before the cycle finished.
    #[error("refresh cycle cancelled")]
    Cancelled,
}

impl SyncError {
    /// Text shown to the user for a failed manual refresh.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }
}
