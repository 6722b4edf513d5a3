use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{check_angle, PulseRange, Servo, ServoError, CENTER_ANGLE};

/// Number of recent writes a [`SimServo`] remembers.
pub const WRITE_HISTORY: usize = 256;

#[derive(Debug)]
struct SimState {
    angle: f32,
    range: PulseRange,
    writes: VecDeque<f32>,
    total_writes: u64,
}

/// In-memory servo. Clones share the same state, so a test can keep a handle
/// while the tracking loop owns another.
#[derive(Clone, Debug)]
pub struct SimServo {
    state: Arc<Mutex<SimState>>,
}

impl SimServo {
    pub fn new(angle: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                angle,
                range: PulseRange::default(),
                writes: VecDeque::with_capacity(WRITE_HISTORY),
                total_writes: 0,
            })),
        }
    }

    /// The last [`WRITE_HISTORY`] angles written, oldest first.
    pub fn writes(&self) -> Vec<f32> {
        self.lock().writes.iter().copied().collect()
    }

    /// Successful writes since creation, including those no longer in
    /// [`SimServo::writes`].
    pub fn write_count(&self) -> u64 {
        self.lock().total_writes
    }

    /// Pulse width the simulated motor would currently receive.
    pub fn pulse_width(&self) -> u32 {
        let state = self.lock();
        state.range.pulse_for(state.angle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        // a poisoned lock only means a test panicked mid-write
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimServo {
    fn default() -> Self {
        Self::new(CENTER_ANGLE)
    }
}

#[async_trait]
impl Servo for SimServo {
    fn angle(&self) -> f32 {
        self.lock().angle
    }

    async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError> {
        let degrees = check_angle(degrees)?;
        let mut state = self.lock();
        state.angle = degrees;
        if state.writes.len() == WRITE_HISTORY {
            state.writes.pop_front();
        }
        state.writes.push_back(degrees);
        state.total_writes += 1;
        Ok(())
    }

    async fn set_pulse_width_range(&mut self, range: PulseRange) -> Result<(), ServoError> {
        let range = PulseRange::new(range.min_us, range.max_us)?;
        self.lock().range = range;
        Ok(())
    }
}
