//! Background task driving periodic job reclamation.

use crate::job::{
    ports::{ChatTransport, JobStore, WebhookNotifier},
    services::lifecycle::JobLifecycleService,
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default delay between two sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Spawns a task that sweeps the service every `interval` until `shutdown`
/// is cancelled.
///
/// The first sweep happens one full interval after spawning. Sweep time is
/// read from the service clock, not from the tokio timer.
pub fn spawn_reaper<S, T, N, C>(
    service: Arc<JobLifecycleService<S, T, N, C>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    S: JobStore + 'static,
    T: ChatTransport + 'static,
    N: WebhookNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "job reaper started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let report = service.run_sweep_now().await;
                    debug!(removed = report.removed(), "job sweep finished");
                }
            }
        }
        info!("job reaper stopped");
    })
}
