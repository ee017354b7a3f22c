pub mod engine;
pub mod fetch;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{CycleReport, RefreshTrigger, SyncEngine};
pub use fetch::FetchBatch;
pub use state::{AppState, StateCell};
