use async_trait::async_trait;

use crate::{PulseRange, ServoError};

/// A positional servo driven in degrees.
///
/// Only the tracking loop writes angles, so implementations take `&mut self`
/// and need no locking of their own.
#[async_trait]
pub trait Servo: Send {
    /// Last angle successfully commanded.
    fn angle(&self) -> f32;

    /// Move to `degrees`. Values outside `0..=180` are rejected with
    /// [`ServoError::OutOfRange`] and leave the servo where it was.
    async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError>;

    /// Calibrate the pulse widths that correspond to 0 and 180 degrees.
    async fn set_pulse_width_range(&mut self, range: PulseRange) -> Result<(), ServoError>;
}

#[async_trait]
impl<S: Servo + ?Sized> Servo for Box<S> {
    fn angle(&self) -> f32 {
        (**self).angle()
    }

    async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError> {
        (**self).set_angle(degrees).await
    }

    async fn set_pulse_width_range(&mut self, range: PulseRange) -> Result<(), ServoError> {
        (**self).set_pulse_width_range(range).await
    }
}
