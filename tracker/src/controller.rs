//! Proportional pan/tilt control.
//!
//! One call to [`step`] reads both servo angles, computes where they should
//! point to bring the hand anchor to the frame centre, and moves each servo
//! at most `step` degrees toward that target.

use serde::{Deserialize, Serialize};
use sensor::{FrameSize, Landmark, Pose};
use servo::{ServoError, MAX_ANGLE};

use crate::RigContext;

/// Gains and limits of the controller. Fixed for the life of the process.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlParams {
    /// Degrees of pan per pixel of horizontal error.
    pub kp_pan: f32,
    /// Degrees of tilt per pixel of vertical error.
    pub kp_tilt: f32,
    /// Pixel errors smaller than this are ignored.
    pub deadzone: f32,
    /// Largest angle change per cycle, in degrees.
    pub step: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            kp_pan: 0.03,
            kp_tilt: 0.03,
            deadzone: 30.0,
            step: 1.5,
        }
    }
}

/// What a single control step did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepOutcome {
    /// No hand: servos keep their last position.
    Held,
    Moved { pan: f32, tilt: f32 },
}

pub fn clamp_angle(angle: f32) -> f32 {
    angle.clamp(0.0, MAX_ANGLE)
}

/// Move from `current` toward `target` by at most `step`.
pub fn smooth_movement(current: f32, target: f32, step: f32) -> f32 {
    if (target - current).abs() < step {
        target
    } else if target > current {
        current + step
    } else {
        current - step
    }
}

pub fn apply_deadzone(error: f32, deadzone: f32) -> f32 {
    if error.abs() < deadzone {
        0.0
    } else {
        error
    }
}

/// Clamped target angles for an anchor seen at `anchor`.
///
/// Pan decreases and tilt increases with positive pixel error; this matches
/// how the camera is mounted on the rig.
pub fn targets(
    params: &ControlParams,
    anchor: Landmark,
    frame: FrameSize,
    pan: f32,
    tilt: f32,
) -> (f32, f32) {
    let (cx, cy) = frame.center();
    let error_x = apply_deadzone(anchor.x - cx, params.deadzone);
    let error_y = apply_deadzone(anchor.y - cy, params.deadzone);
    (
        clamp_angle(pan - error_x * params.kp_pan),
        clamp_angle(tilt + error_y * params.kp_tilt),
    )
}

/// Run one control cycle against the servos held by `ctx`.
///
/// Pan is written before tilt; if the pan write fails tilt is left alone.
pub async fn step(ctx: &mut RigContext, pose: &Pose) -> Result<StepOutcome, ServoError> {
    let Some(anchor) = pose.anchor() else {
        return Ok(StepOutcome::Held);
    };
    let (pan, tilt) = ctx.angles();
    let (target_pan, target_tilt) = targets(&ctx.params, anchor, pose.frame, pan, tilt);
    let pan = smooth_movement(pan, target_pan, ctx.params.step);
    let tilt = smooth_movement(tilt, target_tilt, ctx.params.step);
    ctx.pan.set_angle(pan).await?;
    ctx.tilt.set_angle(tilt).await?;
    Ok(StepOutcome::Moved { pan, tilt })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_gap_jumps_to_target() {
        assert_eq!(smooth_movement(90.0, 90.7, 1.5), 90.7);
        assert_eq!(smooth_movement(90.0, 89.0, 1.5), 89.0);
    }

    #[test]
    fn large_gap_moves_one_step() {
        assert_eq!(smooth_movement(90.0, 100.0, 1.5), 91.5);
        assert_eq!(smooth_movement(90.0, 80.0, 1.5), 88.5);
    }

    #[test]
    fn deadzone_zeroes_small_errors() {
        assert_eq!(apply_deadzone(29.9, 30.0), 0.0);
        assert_eq!(apply_deadzone(-29.9, 30.0), 0.0);
        assert_eq!(apply_deadzone(30.0, 30.0), 30.0);
        assert_eq!(apply_deadzone(-45.0, 30.0), -45.0);
    }

    #[test]
    fn clamp_holds_bounds() {
        assert_eq!(clamp_angle(-12.0), 0.0);
        assert_eq!(clamp_angle(200.0), 180.0);
        assert_eq!(clamp_angle(45.0), 45.0);
    }
}
