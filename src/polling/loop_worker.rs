use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::sync::{RefreshTrigger, SyncEngine};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Run an automatic refresh every `period` until `cancel_token` fires.
///
/// The first cycle runs one full period after start. A tick that arrives
/// while the previous cycle is still running is dropped, not queued.
pub async fn polling_loop(engine: Arc<SyncEngine>, period: Duration, cancel_token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("polling loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                    log_debug!("previous automatic refresh still running; skipping tick");
                    continue;
                }
                in_flight = Some(spawn_cycle(Arc::clone(&engine), cancel_token.child_token()));
            }
        }
    }

    if let Some(handle) = in_flight {
        if let Err(err) = handle.await {
            log_warn!("automatic refresh task failed to join: {err}");
        }
    }
}

fn spawn_cycle(engine: Arc<SyncEngine>, cycle_token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match engine.refresh(RefreshTrigger::Automatic, &cycle_token).await {
            Ok(report) => log_debug!(
                "[{}] automatic refresh done ({} zones)",
                report.cycle_id,
                report.zones
            ),
            Err(SyncError::Cancelled) => log_debug!("automatic refresh cancelled"),
            // already logged by the engine
            Err(_) => {}
        }
    })
}
