//! Hand-following control for the pan/tilt rig.
//!
//! [`controller`] turns one pose into servo moves. [`supervisor`] runs it at
//! a fixed cadence and rebuilds the pose source whenever it faults.

pub mod context;
pub mod controller;
pub mod frame;
pub mod status;
pub mod supervisor;

pub use context::RigContext;
pub use controller::{ControlParams, StepOutcome};
pub use frame::FrameBuffer;
pub use status::RigStatus;
pub use supervisor::{pacing_delay, SourceFactory, SourceState, Supervisor, MIN_SLEEP};
