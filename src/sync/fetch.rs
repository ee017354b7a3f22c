use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::models::Reading;
use crate::remote::ReadingFetcher;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_warn};

/// Outcome of one concurrent fetch sweep.
#[derive(Debug, Default)]
pub struct FetchBatch {
    /// Successful readings in request order.
    pub readings: Vec<Reading>,
    /// Zone ids that produced no reading this sweep.
    pub failed: Vec<String>,
}

/// Run `fut` unless `cancel` fires first.
pub(crate) async fn until_cancelled<F>(cancel: &CancellationToken, fut: F) -> Result<F::Output, SyncError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        output = fut => Ok(output),
    }
}

/// Fetch every zone in `zone_ids` on its own task and wait for all of them.
///
/// A failed or panicked fetch only loses that zone. Cancellation aborts every
/// task still running and discards whatever was collected.
pub async fn fetch_readings(
    fetcher: &Arc<dyn ReadingFetcher>,
    zone_ids: &[String],
    cancel: &CancellationToken,
    cycle_id: &str,
) -> Result<FetchBatch, SyncError> {
    if zone_ids.is_empty() {
        return Ok(FetchBatch::default());
    }

    let mut tasks = JoinSet::new();
    for (index, zone_id) in zone_ids.iter().cloned().enumerate() {
        let fetcher = Arc::clone(fetcher);
        tasks.spawn(async move {
            let result = fetcher.fetch_reading(&zone_id).await;
            (index, zone_id, result)
        });
    }

    let mut slots: Vec<Option<Reading>> = vec![None; zone_ids.len()];

    loop {
        let joined = match until_cancelled(cancel, tasks.join_next()).await {
            Ok(Some(joined)) => joined,
            Ok(None) => break,
            Err(cancelled) => {
                tasks.abort_all();
                return Err(cancelled);
            }
        };

        match joined {
            Ok((index, _, Ok(reading))) => slots[index] = Some(reading),
            Ok((_, zone_id, Err(cause))) => {
                let err = SyncError::ReadingFetch { zone_id, cause };
                log_warn!("[{cycle_id}] {err}");
            }
            Err(join_err) => {
                log_error!("[{cycle_id}] reading task did not complete: {join_err}");
            }
        }
    }

    let mut batch = FetchBatch::default();
    for (zone_id, slot) in zone_ids.iter().zip(slots) {
        match slot {
            Some(reading) => batch.readings.push(reading),
            None => batch.failed.push(zone_id.clone()),
        }
    }
    Ok(batch)
}
