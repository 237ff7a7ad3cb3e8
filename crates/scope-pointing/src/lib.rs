pub mod display;
pub mod trail;
pub mod transform;

pub use display::{CompassDirection, Heading, HudStatus};
pub use trail::{TrailBuffer, TrailPoint};
pub use transform::{compute_state, rotation_matrix, PointingState, BORESIGHT_LOCAL};
