use sensor::{Detection, FrameSize, Hand, Landmark, Pose};
use servo::{Servo, SimServo};
use tracker::controller::{step, targets};
use tracker::{ControlParams, RigContext, StepOutcome};

const FRAME: FrameSize = FrameSize::new(640, 480);

fn pose_at(x: f32, y: f32) -> Pose {
    Detection::with_hand(FRAME, Hand::at(Landmark::new(x, y))).into_pose()
}

fn rig(pan: f32, tilt: f32) -> (RigContext, SimServo, SimServo) {
    let pan = SimServo::new(pan);
    let tilt = SimServo::new(tilt);
    let ctx = RigContext::new(ControlParams::default(), pan.clone(), tilt.clone());
    (ctx, pan, tilt)
}

#[test]
fn hand_right_of_centre_pans_down() {
    let params = ControlParams::default();
    let (pan, tilt) = targets(&params, Landmark::new(420.0, 240.0), FRAME, 90.0, 90.0);
    assert!((pan - 87.0).abs() < 1e-4, "pan target {pan}");
    assert_eq!(tilt, 90.0);
}

#[test]
fn hand_below_centre_tilts_up() {
    let params = ControlParams::default();
    let (pan, tilt) = targets(&params, Landmark::new(320.0, 340.0), FRAME, 90.0, 90.0);
    assert_eq!(pan, 90.0);
    assert!((tilt - 93.0).abs() < 1e-4, "tilt target {tilt}");
}

#[test]
fn targets_are_clamped() {
    let params = ControlParams::default();
    let (pan, tilt) = targets(&params, Landmark::new(640.0, 480.0), FRAME, 2.0, 178.0);
    assert_eq!(pan, 0.0);
    assert_eq!(tilt, 180.0);
}

#[tokio::test]
async fn step_moves_one_step_toward_target() {
    let (mut ctx, pan, tilt) = rig(90.0, 90.0);
    let outcome = step(&mut ctx, &pose_at(420.0, 340.0)).await.unwrap();
    assert_eq!(outcome, StepOutcome::Moved { pan: 88.5, tilt: 91.5 });
    assert_eq!(pan.angle(), 88.5);
    assert_eq!(tilt.angle(), 91.5);
}

#[tokio::test]
async fn errors_inside_deadzone_hold_angles() {
    let (mut ctx, pan, tilt) = rig(75.0, 105.0);
    for dx in [-29.0, -10.0, 0.0, 15.0, 29.0] {
        for dy in [-29.0, -1.0, 0.0, 20.0, 29.0] {
            step(&mut ctx, &pose_at(320.0 + dx, 240.0 + dy)).await.unwrap();
            assert_eq!(pan.angle(), 75.0);
            assert_eq!(tilt.angle(), 105.0);
        }
    }
}

#[tokio::test]
async fn no_hand_holds_last_position() {
    let (mut ctx, pan, tilt) = rig(60.0, 120.0);
    let pose = Detection::empty(FRAME).into_pose();
    let outcome = step(&mut ctx, &pose).await.unwrap();
    assert_eq!(outcome, StepOutcome::Held);
    assert_eq!(ctx.angles(), (60.0, 120.0));
    assert!(pan.writes().is_empty());
    assert!(tilt.writes().is_empty());
}

#[tokio::test]
async fn angles_stay_bounded_and_rate_limited() {
    let anchors = [(0.0, 0.0), (640.0, 480.0), (0.0, 480.0), (640.0, 0.0), (330.0, 250.0)];
    for start in [0.0, 0.5, 1.0, 90.0, 179.2, 180.0] {
        for (x, y) in anchors {
            let (mut ctx, pan, tilt) = rig(start, start);
            for _ in 0..150 {
                let before = (pan.angle(), tilt.angle());
                step(&mut ctx, &pose_at(x, y)).await.unwrap();
                for (old, new) in [(before.0, pan.angle()), (before.1, tilt.angle())] {
                    assert!((0.0..=180.0).contains(&new), "angle {new} out of bounds");
                    assert!((new - old).abs() <= 1.5 + 1e-4, "moved {old} -> {new}");
                }
            }
        }
    }
}

#[tokio::test]
async fn pan_failure_skips_tilt() {
    struct Broken;

    #[async_trait::async_trait]
    impl Servo for Broken {
        fn angle(&self) -> f32 {
            90.0
        }
        async fn set_angle(&mut self, degrees: f32) -> Result<(), servo::ServoError> {
            Err(servo::ServoError::OutOfRange(degrees))
        }
        async fn set_pulse_width_range(&mut self, _: servo::PulseRange) -> Result<(), servo::ServoError> {
            Ok(())
        }
    }

    let tilt = SimServo::new(90.0);
    let mut ctx = RigContext::new(ControlParams::default(), Broken, tilt.clone());
    assert!(step(&mut ctx, &pose_at(500.0, 400.0)).await.is_err());
    assert!(tilt.writes().is_empty());
}
