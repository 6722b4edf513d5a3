use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sensor::{Detection, FrameSize, Hand, Landmark, PoseSource, ReplaySource, SensorError};
use servo::{PulseRange, Servo, ServoError, SimServo, WRITE_HISTORY};
use tracker::{
    pacing_delay, ControlParams, FrameBuffer, RigContext, SourceState, StepOutcome, Supervisor,
    MIN_SLEEP,
};

const FRAME: FrameSize = FrameSize::new(640, 480);

/// Source that plays back a fixed script, then reports no hand.
struct Scripted {
    script: VecDeque<Result<Detection, SensorError>>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl PoseSource for Scripted {
    async fn next_detection(&mut self) -> Result<Detection, SensorError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(Detection::empty(FRAME)))
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn describe(&self) -> &'static str {
        "scripted"
    }
}

fn hand_right() -> Detection {
    Detection::with_hand(FRAME, Hand::at(Landmark::new(420.0, 240.0)))
}

fn boxed(source: impl PoseSource + 'static) -> Result<Box<dyn PoseSource>, SensorError> {
    Ok(Box::new(source))
}

fn replay(detections: Vec<Detection>) -> Result<Box<dyn PoseSource>, SensorError> {
    boxed(ReplaySource::from_detections(detections))
}

fn near(a: Duration, b: Duration) -> bool {
    a.max(b) - a.min(b) < Duration::from_micros(1)
}

fn rig() -> (RigContext, SimServo, SimServo) {
    let pan = SimServo::new(90.0);
    let tilt = SimServo::new(90.0);
    let ctx = RigContext::new(ControlParams::default(), pan.clone(), tilt.clone());
    (ctx, pan, tilt)
}

#[test]
fn pacing_fills_the_frame_period() {
    let period = Duration::from_secs_f64(1.0 / 15.0);
    let delay = pacing_delay(Duration::from_millis(10), 15);
    let expected = period - Duration::from_millis(10);
    assert!(near(delay, expected));
    assert!(near(pacing_delay(Duration::ZERO, 15), period));
}

#[test]
fn pacing_never_drops_below_minimum() {
    assert_eq!(pacing_delay(Duration::from_millis(30), 15), MIN_SLEEP);
    assert_eq!(pacing_delay(Duration::from_secs(3), 15), MIN_SLEEP);
    assert_eq!(pacing_delay(Duration::ZERO, 0), MIN_SLEEP);
}

#[tokio::test]
async fn tracks_hand_with_ready_source() {
    let (ctx, pan, _tilt) = rig();
    let factory = || async { replay(vec![hand_right()]) };
    let mut supervisor = Supervisor::new(factory, ctx);
    assert_eq!(supervisor.state(), SourceState::Uninitialized);

    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Ready);
    assert_eq!(pan.angle(), 88.5);
    assert_eq!(
        supervisor.status().last_step,
        Some(StepOutcome::Moved { pan: 88.5, tilt: 90.0 })
    );
    assert!(supervisor.status().hand_visible);
}

#[tokio::test]
async fn faulting_source_is_rebuilt_next_cycle() {
    let (ctx, pan, _tilt) = rig();
    let builds = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicUsize::new(0));
    let factory = {
        let builds = builds.clone();
        let closed = closed.clone();
        move || {
            let n = builds.fetch_add(1, Ordering::SeqCst);
            let first = if n == 0 {
                Err(SensorError::Runtime("device lost".into()))
            } else {
                Ok(hand_right())
            };
            let source = Scripted {
                script: VecDeque::from([first]),
                closed: closed.clone(),
            };
            async move { boxed(source) }
        }
    };
    let mut supervisor = Supervisor::new(factory, ctx);

    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Failed);
    assert_eq!(supervisor.status().restarts, 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(pan.writes().is_empty());

    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Ready);
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(pan.angle(), 88.5);
}

#[tokio::test]
async fn failed_construction_is_retried() {
    let (ctx, _pan, _tilt) = rig();
    let attempts = Arc::new(AtomicUsize::new(0));
    let factory = {
        let attempts = attempts.clone();
        move || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(SensorError::Spawn("no camera".into()))
                } else {
                    replay(vec![])
                }
            }
        }
    };
    let mut supervisor = Supervisor::new(factory, ctx);
    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Failed);
    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Ready);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn servo_errors_keep_the_source() {
    struct Jammed;

    #[async_trait]
    impl Servo for Jammed {
        fn angle(&self) -> f32 {
            90.0
        }
        async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError> {
            Err(ServoError::OutOfRange(degrees))
        }
        async fn set_pulse_width_range(&mut self, _: PulseRange) -> Result<(), ServoError> {
            Ok(())
        }
    }

    let ctx = RigContext::new(ControlParams::default(), Jammed, SimServo::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let factory = {
        let builds = builds.clone();
        move || {
            builds.fetch_add(1, Ordering::SeqCst);
            async { replay(vec![hand_right()]) }
        }
    };
    let mut supervisor = Supervisor::new(factory, ctx);
    supervisor.cycle().await;
    supervisor.cycle().await;
    assert_eq!(supervisor.state(), SourceState::Ready);
    assert_eq!(supervisor.status().servo_errors, 2);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn status_and_frames_are_published() {
    let (ctx, _pan, _tilt) = rig();
    let mut detection = hand_right();
    detection.frame = Some("aGFuZA==".into());
    let factory = move || {
        let detection = detection.clone();
        async move { replay(vec![detection]) }
    };
    let frames = FrameBuffer::new();
    let mut supervisor = Supervisor::new(factory, ctx).with_frames(frames.clone());
    let status = supervisor.subscribe();

    supervisor.cycle().await;
    let snapshot = status.borrow().clone();
    assert_eq!(snapshot.source, SourceState::Ready);
    assert_eq!(snapshot.cycles, 1);
    assert_eq!(snapshot.pan, 88.5);
    assert!(frames.has_frame().await);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["source"], "ready");
    assert_eq!(json["last_step"]["kind"], "moved");
}

#[tokio::test]
async fn run_stops_after_cycle_limit_and_paces() {
    let (ctx, _pan, _tilt) = rig();
    let factory = || async { replay(vec![]) };
    let mut supervisor = Supervisor::new(factory, ctx).with_target_fps(15);
    let start = Instant::now();
    supervisor.run(Some(3)).await;
    assert!(start.elapsed() >= MIN_SLEEP * 2);
    assert_eq!(supervisor.status().cycles, 3);
}

#[tokio::test]
async fn long_runs_keep_servo_history_bounded() {
    let (ctx, pan, _tilt) = rig();
    let left = Detection::with_hand(FRAME, Hand::at(Landmark::new(220.0, 240.0)));
    let factory = move || {
        let swing = vec![hand_right(), left.clone()];
        async move { replay(swing) }
    };
    let mut supervisor = Supervisor::new(factory, ctx);
    let cycles = WRITE_HISTORY * 20;
    for _ in 0..cycles {
        supervisor.cycle().await;
    }
    assert_eq!(pan.write_count(), cycles as u64);
    assert_eq!(pan.writes().len(), WRITE_HISTORY);
}
