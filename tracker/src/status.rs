use serde::Serialize;

use crate::{SourceState, StepOutcome};

/// Snapshot of the tracking loop, published after every cycle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RigStatus {
    pub source: SourceState,
    pub pan: f32,
    pub tilt: f32,
    pub hand_visible: bool,
    pub last_step: Option<StepOutcome>,
    pub cycles: u64,
    pub restarts: u64,
    pub servo_errors: u64,
}

impl RigStatus {
    pub fn new(pan: f32, tilt: f32) -> Self {
        Self {
            source: SourceState::Uninitialized,
            pan,
            tilt,
            hand_visible: false,
            last_step: None,
            cycles: 0,
            restarts: 0,
            servo_errors: 0,
        }
    }
}
