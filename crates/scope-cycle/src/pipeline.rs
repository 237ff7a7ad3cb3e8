use crate::presentation::{DisplayFrame, PresentationSink};
use glam::DVec3;
use scope_config::AppConfig;
use scope_egress::{Dispatch, EgressForwarder};
use scope_pointing::{compute_state, Heading, HudStatus, PointingState, TrailBuffer};
use scope_telemetry::{decode, Datagram, MalformedTelemetry, OrientationSample, TelemetryListener};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum TickError {
    #[error("Malformed telemetry from {from}: {error}")]
    Malformed {
        from: SocketAddr,
        #[source]
        error: MalformedTelemetry,
    },
    #[error("Telemetry socket error: {0}")]
    Socket(#[from] io::Error),
    #[error("Non-finite pointing computed from {sample:?}")]
    NumericAnomaly { sample: OrientationSample },
}

/// What a single tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Datagrams pulled off the socket.
    pub received: usize,
    /// Samples that made it into the trail.
    pub accepted: usize,
    /// Problems encountered, in order. None of them stop the cycle.
    pub errors: Vec<TickError>,
    /// Whether the presentation sink took a frame without error.
    pub presented: bool,
    /// Egress outcome, if a sample was accepted and egress is enabled.
    pub egress: Option<Dispatch>,
}

/// Running totals across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub ticks: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub socket_errors: u64,
    pub numeric_anomalies: u64,
    pub presentation_errors: u64,
}

/// All state the update cycle owns between ticks.
pub struct PipelineState {
    listener: TelemetryListener,
    trail: TrailBuffer,
    egress: Option<EgressForwarder>,
    tip_local: DVec3,
    altitude_warning_deg: f64,
    max_datagrams_per_tick: usize,
    latest: Option<PointingState>,
    stats: CycleStats,
}

impl PipelineState {
    pub fn new(
        config: &AppConfig,
        listener: TelemetryListener,
        egress: Option<EgressForwarder>,
    ) -> Self {
        Self {
            listener,
            trail: TrailBuffer::new(config.trail.capacity, config.trail.min_opacity),
            egress,
            tip_local: DVec3::new(0.0, 0.0, config.trail.tip_length),
            altitude_warning_deg: config.display.altitude_warning_deg,
            max_datagrams_per_tick: config.telemetry.max_datagrams_per_tick,
            latest: None,
            stats: CycleStats::default(),
        }
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Last published pointing.
    pub fn latest(&self) -> Option<PointingState> {
        self.latest
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn listener(&self) -> &TelemetryListener {
        &self.listener
    }

    pub fn egress(&self) -> Option<&EgressForwarder> {
        self.egress.as_ref()
    }
}

/// Decode and transform one datagram. Nothing is mutated unless this succeeds.
fn accept(datagram: &Datagram<'_>) -> Result<PointingState, TickError> {
    let sample = decode(datagram.payload).map_err(|error| TickError::Malformed {
        from: datagram.source,
        error,
    })?;

    let pointing = compute_state(&sample);
    if !pointing.is_finite() {
        return Err(TickError::NumericAnomaly { sample });
    }
    Ok(pointing)
}

/// Run one update cycle.
///
/// Drains pending datagrams (up to the configured cap) in arrival order. Every accepted
/// sample extends the trail; the newest one of the tick is handed to the presentation
/// sink and then to egress. Ticks with no accepted sample publish nothing.
pub fn tick<P: PresentationSink + ?Sized>(state: &mut PipelineState, sink: &mut P) -> TickReport {
    let mut report = TickReport::default();
    let mut newest = None;
    state.stats.ticks += 1;

    for _ in 0..state.max_datagrams_per_tick {
        let result = match state.listener.poll_once() {
            Ok(None) => break,
            Ok(Some(datagram)) => {
                report.received += 1;
                accept(&datagram)
            }
            Err(e) => Err(TickError::Socket(e)),
        };

        match result {
            Ok(pointing) => {
                state.trail.push(pointing.tip_position(state.tip_local));
                newest = Some(pointing);
                report.accepted += 1;
                state.stats.accepted += 1;
                if state.stats.accepted % 1000 == 0 {
                    debug!(samples = state.stats.accepted, "Telemetry samples processed");
                }
            }
            Err(e) => {
                let end_drain = matches!(e, TickError::Socket(_));
                record_error(&mut state.stats, &e);
                report.errors.push(e);
                if end_drain {
                    break;
                }
            }
        }
    }

    let Some(pointing) = newest else {
        return report;
    };
    state.latest = Some(pointing);

    let frame = DisplayFrame {
        transform: pointing.transform(),
        trail: state.trail.snapshot_with_opacity(),
        pointing,
        heading: Heading::from_azimuth(pointing.azimuth_deg),
        hud: HudStatus::new(&pointing, state.altitude_warning_deg),
    };
    match sink.present(frame) {
        Ok(()) => report.presented = true,
        Err(e) => {
            state.stats.presentation_errors += 1;
            warn!(error = %e, "Presentation update failed");
        }
    }

    if let Some(egress) = &mut state.egress {
        let payload = egress.payload_for(&pointing);
        report.egress = Some(egress.dispatch(payload));
    }

    report
}

fn record_error(stats: &mut CycleStats, e: &TickError) {
    match e {
        TickError::Malformed { .. } => {
            stats.malformed += 1;
            warn!(error = %e, "Dropping telemetry datagram");
        }
        TickError::Socket(_) => {
            stats.socket_errors += 1;
            warn!(error = %e, "Telemetry receive failed, retrying next tick");
        }
        TickError::NumericAnomaly { sample } => {
            stats.numeric_anomalies += 1;
            error!(?sample, "Non-finite pointing computed from telemetry sample");
        }
    }
}
