use super::cache::{CallRegistry, RefreshOutcome};
use crate::console::ConsoleEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Recurring refresh of a [`CallRegistry`].
///
/// Refreshes immediately, then every `interval`, and whenever the shared
/// trigger is notified. Errors never stop the loop; only cancellation does.
/// Dropping the task cancels it.
pub struct RefreshTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    pub fn spawn(
        registry: Arc<CallRegistry>,
        interval: Duration,
        trigger: Arc<Notify>,
        events: mpsc::UnboundedSender<ConsoleEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            info!("Refresh task started (every {:?})", interval);

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = trigger.notified() => {
                        debug!("Refresh requested");
                        ticker.reset();
                    }
                }

                // A cancelled view must not see the result of an in-flight fetch
                let result = tokio::select! {
                    _ = token.cancelled() => break,
                    result = registry.refresh() => result,
                };

                let event = match result {
                    Ok(RefreshOutcome::Applied(calls)) => ConsoleEvent::Refreshed { calls },
                    Ok(RefreshOutcome::Stale) => continue,
                    Err(e) if e.is_unauthorized() => ConsoleEvent::SessionExpired,
                    Err(e) => ConsoleEvent::RefreshFailed {
                        message: e.to_string(),
                    },
                };

                if events.send(event).is_err() {
                    debug!("Event receiver dropped");
                }
            }

            info!("Refresh task stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel the loop and wait for it to finish
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Refresh task panicked: {}", e);
            }
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
