use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sync::SyncEngine;

use super::loop_worker::polling_loop;

/// Owns the background polling task.
#[derive(Default)]
pub struct PollingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl PollingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start polling every `period`. Cancelling `parent` stops the loop too.
    pub fn start_polling(
        &mut self,
        engine: Arc<SyncEngine>,
        period: Duration,
        parent: &CancellationToken,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("polling already active");
        }

        info!("Starting automatic refresh every {}s", period.as_secs());
        let cancel_token = parent.child_token();
        let handle = tokio::spawn(polling_loop(engine, period, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the loop and any cycle it has in flight, then wait for it.
    pub async fn stop_polling(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("polling loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
