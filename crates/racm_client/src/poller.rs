use std::sync::{mpsc, Arc};
use std::time::Duration;

use client_logging::client_debug;
use racm_core::Phase;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::types::ClientEvent;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Handle to a running status poller. Cancellation is synchronous and
/// idempotent; cancelling an already-finished poller is a no-op.
#[derive(Debug, Clone)]
pub struct PollHandle {
    token: CancellationToken,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Spawn the recurring status poller for one job onto `runtime`.
///
/// The loop awaits each status request before taking the next tick, so a
/// slow response delays the next poll instead of stacking a second request
/// on top of it. One `ClientEvent::Status` is emitted per completed tick.
/// The poller stops itself once a snapshot carries a terminal phase, when
/// the event receiver goes away, or when the handle is cancelled.
pub fn spawn_poller(
    runtime: &tokio::runtime::Handle,
    api: Arc<dyn JobApi>,
    job_id: String,
    interval: Duration,
    events: mpsc::Sender<ClientEvent>,
) -> PollHandle {
    let token = CancellationToken::new();
    let task_token = token.clone();

    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; skip that tick so the first request
        // goes out one full interval after submission.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = task_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = task_token.cancelled() => break,
                result = api.status(&job_id) => result,
            };

            let terminal = matches!(
                &result,
                Ok(status) if Phase::parse(&status.phase).is_some_and(Phase::is_terminal)
            );
            if events
                .send(ClientEvent::Status {
                    job_id: job_id.clone(),
                    result,
                })
                .is_err()
            {
                break;
            }
            if terminal {
                client_debug!("poller for job {} reached a terminal phase", job_id);
                break;
            }
        }
    });

    PollHandle { token }
}
