//! Best-effort forwarding of the current pointing to a planetarium viewer.
//!
//! Each update posts the latest azimuth/altitude over HTTP with a short timeout.
//! Failures are logged and dropped: there is no retry and no queue, and at most one
//! request is in flight at a time.

use reqwest::{Client, StatusCode};
use scope_config::EgressConfig;
use scope_pointing::PointingState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("Viewer request timed out")]
    Timeout,
    #[error("Viewer request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Viewer answered with status {0}")]
    Status(StatusCode),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Egress requires a running tokio runtime")]
    NoRuntime,
}

impl EgressError {
    fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EgressError::Timeout
        } else {
            EgressError::Transport(e)
        }
    }
}

/// View update sent to the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgressPayload {
    pub azimuth_rad: f64,
    pub altitude_rad: f64,
    pub fov_deg: f64,
}

impl EgressPayload {
    pub fn from_pointing(state: &PointingState, fov_deg: f64) -> Self {
        Self {
            azimuth_rad: state.azimuth_rad(),
            altitude_rad: state.altitude_rad(),
            fov_deg,
        }
    }

    /// Form fields in the order the viewer's remote-control API documents them.
    fn form(&self) -> [(&'static str, f64); 3] {
        [
            ("az", self.azimuth_rad),
            ("alt", self.altitude_rad),
            ("fov", self.fov_deg),
        ]
    }
}

/// Outcome of a fire-and-forget dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A request was started.
    Sent,
    /// The previous request is still running; this update was dropped.
    Skipped,
}

/// Counters shared with in-flight requests.
#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EgressStats {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Clone)]
struct Endpoint {
    client: Client,
    url: String,
}

impl Endpoint {
    async fn post(&self, payload: EgressPayload) -> Result<(), EgressError> {
        let response = self
            .client
            .post(&self.url)
            .form(&payload.form()[..])
            .send()
            .await
            .map_err(EgressError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EgressError::Status(status));
        }
        Ok(())
    }
}

/// HTTP forwarder for pointing updates.
pub struct EgressForwarder {
    endpoint: Endpoint,
    timeout: Duration,
    fov_deg: f64,
    runtime: Handle,
    in_flight: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl EgressForwarder {
    /// Build a forwarder bound to the current tokio runtime.
    pub fn new(config: &EgressConfig) -> Result<Self, EgressError> {
        let runtime = Handle::try_current().map_err(|_| EgressError::NoRuntime)?;
        let client = Client::builder()
            .timeout(config.timeout())
            .no_proxy()
            .build()
            .map_err(EgressError::Client)?;

        tracing::info!(url = %config.url, timeout_ms = config.timeout_ms, "Egress forwarder ready");

        Ok(Self {
            endpoint: Endpoint {
                client,
                url: config.url.clone(),
            },
            timeout: config.timeout(),
            fov_deg: config.fov_deg,
            runtime,
            in_flight: None,
            counters: Arc::new(Counters::default()),
        })
    }

    /// Payload for `state` with the configured field of view.
    pub fn payload_for(&self, state: &PointingState) -> EgressPayload {
        EgressPayload::from_pointing(state, self.fov_deg)
    }

    /// Post one update and wait for the outcome, bounded by the configured timeout.
    pub async fn send(&self, payload: EgressPayload) -> Result<(), EgressError> {
        self.endpoint.post(payload).await
    }

    /// Start posting `payload` without waiting for it.
    ///
    /// Returns `Dispatch::Skipped` while the previous request is still running.
    pub fn dispatch(&mut self, payload: EgressPayload) -> Dispatch {
        if self.is_in_flight() {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Egress request still in flight, skipping update");
            return Dispatch::Skipped;
        }

        let endpoint = self.endpoint.clone();
        let counters = self.counters.clone();
        counters.sent.fetch_add(1, Ordering::Relaxed);

        self.in_flight = Some(self.runtime.spawn(async move {
            if let Err(e) = endpoint.post(payload).await {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, url = %endpoint.url, "Viewer sync failed");
            }
        }));
        Dispatch::Sent
    }

    /// Whether a dispatched request has not completed yet.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> EgressStats {
        EgressStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}
