//! Process wiring for the pan/tilt hand follower: command line, logging,
//! servo and pose-source construction, and the landmark preview renderer.

pub mod config;
pub mod logging;
pub mod preview;
pub mod wiring;

pub use config::{RigArgs, ServoKind, SourceKind};
pub use logging::init_logging;
pub use wiring::{RigSource, build_servos};
