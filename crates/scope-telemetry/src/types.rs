/// One decoded orientation reading from the mount, in degrees.
///
/// `pitch` is already sign-corrected for the mount's telemetry polarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OrientationSample {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Whether all three angles are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

impl Default for OrientationSample {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
