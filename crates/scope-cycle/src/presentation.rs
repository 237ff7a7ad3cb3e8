use anyhow::Result;
use glam::DMat4;
use scope_pointing::{Heading, HudStatus, PointingState, TrailPoint};
use tracing::{debug, info, warn};

/// Everything the display needs for one update, owned so the next tick cannot
/// change it underneath the consumer.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    /// Rotation-only model transform for the dish, arm and receiver.
    pub transform: DMat4,
    /// Trail points oldest to newest with fade opacity.
    pub trail: Vec<TrailPoint>,
    pub pointing: PointingState,
    pub heading: Heading,
    pub hud: HudStatus,
}

/// Consumer of per-tick display updates (a GUI, a logger, a test probe).
pub trait PresentationSink: Send {
    /// Take the latest frame. Errors are reported by the update cycle and do not affect
    /// telemetry processing or egress.
    fn present(&mut self, frame: DisplayFrame) -> Result<()>;
}

/// Presentation sink that writes the heading and HUD to the log.
#[derive(Default)]
pub struct LogPresenter {
    altitude_warning: bool,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for LogPresenter {
    fn present(&mut self, frame: DisplayFrame) -> Result<()> {
        if frame.hud.altitude_warning != self.altitude_warning {
            self.altitude_warning = frame.hud.altitude_warning;
            if self.altitude_warning {
                warn!(
                    altitude = frame.hud.altitude_deg,
                    "Pointing below altitude warning threshold"
                );
            } else {
                info!(altitude = frame.hud.altitude_deg, "Altitude back above threshold");
            }
        }

        let [yaw, pitch, roll, azim, alt] = frame.hud.lines();
        debug!(
            heading = %frame.heading.label(),
            %yaw,
            %pitch,
            %roll,
            %azim,
            %alt,
            trail = frame.trail.len(),
            "Pointing update"
        );
        Ok(())
    }
}
