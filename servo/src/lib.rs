//! Hobby servo actuation for the pan/tilt rig.
//!
//! A [`Servo`] accepts an angle in degrees and moves a motor. Implementations
//! range from an in-memory simulator to a Linux sysfs PWM channel.

pub mod error;
pub mod logging;
pub mod pulse;
pub mod sim;
pub mod sysfs;
pub mod traits;

pub use error::ServoError;
pub use logging::LoggingServo;
pub use pulse::{check_angle, PulseRange, CENTER_ANGLE, MAX_ANGLE};
pub use sim::{SimServo, WRITE_HISTORY};
pub use sysfs::SysfsPwmServo;
pub use traits::Servo;
