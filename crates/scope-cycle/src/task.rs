use crate::pipeline::{tick, PipelineState};
use crate::presentation::PresentationSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

/// Runs the update cycle on a fixed period until cancelled.
///
/// Late ticks are skipped rather than bunched up, so a stalled runtime never causes a
/// burst of catch-up ticks.
pub struct PeriodicTask {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<PipelineState>,
}

impl PeriodicTask {
    /// Start ticking `state` every `period` on the current tokio runtime.
    pub fn spawn<P>(period: Duration, mut state: PipelineState, mut sink: P) -> Self
    where
        P: PresentationSink + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(?period, "Update cycle started");

            loop {
                interval.tick().await;
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                tick(&mut state, &mut sink);
            }

            tracing::info!(stats = ?state.stats(), "Update cycle stopped");
            state
        });

        Self { cancel, handle }
    }

    /// Ask the cycle to stop after the current tick.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Wait for the cycle to stop and take back its state.
    pub async fn join(self) -> Result<PipelineState, JoinError> {
        self.handle.await
    }
}
