use crate::transform::PointingState;
use std::fmt;

/// Eight-point compass sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    const ALL: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::NE,
        CompassDirection::E,
        CompassDirection::SE,
        CompassDirection::S,
        CompassDirection::SW,
        CompassDirection::W,
        CompassDirection::NW,
    ];

    /// Sector for an azimuth in degrees. Sectors are 45 degrees wide, centered on each
    /// direction, so N covers [337.5, 22.5).
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        let shifted = (azimuth_deg + 22.5).rem_euclid(360.0);
        let index = (shifted / 45.0).floor() as usize;
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::NE => "NE",
            CompassDirection::E => "E",
            CompassDirection::SE => "SE",
            CompassDirection::S => "S",
            CompassDirection::SW => "SW",
            CompassDirection::W => "W",
            CompassDirection::NW => "NW",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading readout for the compass widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    pub degrees: f64,
    pub direction: CompassDirection,
}

impl Heading {
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        Self {
            degrees: azimuth_deg,
            direction: CompassDirection::from_azimuth(azimuth_deg),
        }
    }

    /// Text for the heading label, e.g. `Heading: 47.0° NE`.
    pub fn label(&self) -> String {
        format!("Heading: {:.1}° {}", self.degrees, self.direction)
    }
}

/// Status block shown on the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct HudStatus {
    pub yaw_deg: f64,
    /// Stored (polarity-corrected) pitch.
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    /// Set when the altitude is below the configured warning threshold.
    pub altitude_warning: bool,
}

impl HudStatus {
    pub fn new(state: &PointingState, altitude_warning_deg: f64) -> Self {
        Self {
            yaw_deg: state.sample.yaw,
            pitch_deg: state.sample.pitch,
            roll_deg: state.sample.roll,
            azimuth_deg: state.azimuth_deg,
            altitude_deg: state.altitude_deg,
            altitude_warning: state.altitude_deg < altitude_warning_deg,
        }
    }

    /// One line per field, labels padded to a common width.
    pub fn lines(&self) -> [String; 5] {
        [
            format!("Yaw:    {:.2}°", self.yaw_deg),
            format!("Pitch:  {:.2}°", self.pitch_deg),
            format!("Roll:   {:.2}°", self.roll_deg),
            format!("Azim:   {:.2}°", self.azimuth_deg),
            format!("AltAng: {:.2}°", self.altitude_deg),
        ]
    }
}
