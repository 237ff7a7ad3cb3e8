use glam::{DMat3, DMat4, DVec3};
use scope_telemetry::OrientationSample;

/// Boresight of the instrument in its own frame.
pub const BORESIGHT_LOCAL: DVec3 = DVec3::Z;

/// Horizontal magnitude below which the boresight counts as vertical.
const POLE_EPSILON: f64 = 1e-9;

/// Pointing derived from one orientation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointingState {
    /// Sample this state was computed from.
    pub sample: OrientationSample,
    /// Mount rotation, intrinsic Z (yaw) -> Y (pitch) -> X (roll).
    pub rotation: DMat3,
    /// World-space boresight direction.
    pub forward: DVec3,
    /// Heading in degrees, `[0, 360)`.
    pub azimuth_deg: f64,
    /// Elevation above the horizon in degrees, `[-90, 90]`.
    pub altitude_deg: f64,
}

impl PointingState {
    /// 4x4 homogeneous transform: pure rotation, no translation or scale.
    pub fn transform(&self) -> DMat4 {
        DMat4::from_mat3(self.rotation)
    }

    /// World position of a point fixed in the mount frame, e.g. the receiver tip.
    pub fn tip_position(&self, tip_local: DVec3) -> DVec3 {
        self.rotation * tip_local
    }

    pub fn azimuth_rad(&self) -> f64 {
        self.azimuth_deg.to_radians()
    }

    pub fn altitude_rad(&self) -> f64 {
        self.altitude_deg.to_radians()
    }

    /// False when NaN or infinity leaked in from the sample.
    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite()
            && self.forward.is_finite()
            && self.azimuth_deg.is_finite()
            && self.altitude_deg.is_finite()
    }
}

/// Rotation matrix for yaw/pitch/roll in degrees, applied intrinsically as Z, Y, then X.
pub fn rotation_matrix(sample: &OrientationSample) -> DMat3 {
    DMat3::from_rotation_z(sample.yaw.to_radians())
        * DMat3::from_rotation_y(sample.pitch.to_radians())
        * DMat3::from_rotation_x(sample.roll.to_radians())
}

/// Derive the full pointing state for a sample.
///
/// Never fails. Non-finite input angles produce a non-finite state, which callers are
/// expected to check with [`PointingState::is_finite`].
pub fn compute_state(sample: &OrientationSample) -> PointingState {
    let rotation = rotation_matrix(sample);
    let forward = rotation * BORESIGHT_LOCAL;

    PointingState {
        sample: *sample,
        rotation,
        forward,
        azimuth_deg: azimuth_deg(forward, sample.yaw),
        altitude_deg: altitude_deg(forward),
    }
}

/// World +Y is north and the x component is negated; the viewer and compass both expect
/// exactly this convention.
///
/// With the boresight vertical the heading is undefined, so the yaw angle is reported.
fn azimuth_deg(forward: DVec3, yaw_deg: f64) -> f64 {
    if forward.x.hypot(forward.y) < POLE_EPSILON {
        return normalize_degrees(yaw_deg);
    }
    normalize_degrees(f64::atan2(-forward.x, forward.y).to_degrees())
}

fn altitude_deg(forward: DVec3) -> f64 {
    let sin_alt = (forward.z / forward.length()).clamp(-1.0, 1.0);
    sin_alt.asin().to_degrees()
}

/// Wrap an angle into `[0, 360)`.
fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
