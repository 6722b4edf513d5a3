use async_trait::async_trait;
use tracing::{debug, info};

use crate::{PulseRange, Servo, ServoError};

/// [`Servo`] wrapper that logs each command before forwarding it.
pub struct LoggingServo<S> {
    label: &'static str,
    inner: S,
}

impl<S: Servo> LoggingServo<S> {
    pub fn new(label: &'static str, inner: S) -> Self {
        Self { label, inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: Servo> Servo for LoggingServo<S> {
    fn angle(&self) -> f32 {
        self.inner.angle()
    }

    async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError> {
        debug!(servo = self.label, from = self.inner.angle(), to = degrees, "servo move");
        self.inner.set_angle(degrees).await
    }

    async fn set_pulse_width_range(&mut self, range: PulseRange) -> Result<(), ServoError> {
        info!(servo = self.label, min_us = range.min_us, max_us = range.max_us, "servo pulse range");
        self.inner.set_pulse_width_range(range).await
    }
}
