//! Hand pose input for the pan/tilt rig.
//!
//! A [`PoseSource`] yields one [`Detection`] per request. Detection itself
//! happens in an external helper process; this crate only speaks its
//! newline-delimited JSON output, or replays a recording of it.

pub mod error;
pub mod options;
pub mod pose;
pub mod process;
pub mod replay;
pub mod source;

pub use error::SensorError;
pub use options::TrackerOptions;
pub use pose::{Detection, FrameSize, Hand, Landmark, Pose, ANCHOR_LANDMARK, HAND_CONNECTIONS};
pub use process::{HelperCommand, ProcessSource};
pub use replay::ReplaySource;
pub use source::PoseSource;
