use servo::{PulseRange, Servo, ServoError, CENTER_ANGLE};
use tracing::info;

use crate::ControlParams;

/// Everything the controller acts on: its parameters and the two servos.
///
/// The tracking loop owns the context and is the only writer of servo angles.
pub struct RigContext {
    pub params: ControlParams,
    pub pan: Box<dyn Servo>,
    pub tilt: Box<dyn Servo>,
}

impl RigContext {
    pub fn new(params: ControlParams, pan: impl Servo + 'static, tilt: impl Servo + 'static) -> Self {
        Self {
            params,
            pan: Box::new(pan),
            tilt: Box::new(tilt),
        }
    }

    /// Current `(pan, tilt)` angles in degrees.
    pub fn angles(&self) -> (f32, f32) {
        (self.pan.angle(), self.tilt.angle())
    }

    /// Apply the pulse calibration to both servos and centre them.
    pub async fn calibrate(&mut self, range: PulseRange) -> Result<(), ServoError> {
        self.pan.set_pulse_width_range(range).await?;
        self.tilt.set_pulse_width_range(range).await?;
        self.pan.set_angle(CENTER_ANGLE).await?;
        self.tilt.set_angle(CENTER_ANGLE).await?;
        info!(min_us = range.min_us, max_us = range.max_us, "servos centred");
        Ok(())
    }
}
