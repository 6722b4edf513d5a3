use serde::{Deserialize, Serialize};

use crate::ServoError;

pub const MAX_ANGLE: f32 = 180.0;
pub const CENTER_ANGLE: f32 = 90.0;

/// Reject angles a servo cannot be commanded to.
pub fn check_angle(degrees: f32) -> Result<f32, ServoError> {
    if degrees.is_finite() && (0.0..=MAX_ANGLE).contains(&degrees) {
        Ok(degrees)
    } else {
        Err(ServoError::OutOfRange(degrees))
    }
}

/// Pulse widths in microseconds for 0 and 180 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRange {
    pub min_us: u32,
    pub max_us: u32,
}

impl PulseRange {
    pub fn new(min_us: u32, max_us: u32) -> Result<Self, ServoError> {
        if min_us == 0 || min_us >= max_us {
            return Err(ServoError::InvalidPulseRange { min_us, max_us });
        }
        Ok(Self { min_us, max_us })
    }

    /// Pulse width for `degrees`, interpolated linearly across the range.
    pub fn pulse_for(&self, degrees: f32) -> u32 {
        let span = (self.max_us - self.min_us) as f32;
        let fraction = degrees.clamp(0.0, MAX_ANGLE) / MAX_ANGLE;
        self.min_us + (fraction * span).round() as u32
    }
}

impl Default for PulseRange {
    /// The wide 500-2500 us range most hobby servos accept.
    fn default() -> Self {
        Self {
            min_us: 500,
            max_us: 2500,
        }
    }
}
