//! The tracking loop.
//!
//! Each cycle makes sure a pose source exists, asks it for one detection,
//! runs the controller and sleeps to hold the target rate. A faulting source
//! is closed and dropped; the next cycle builds a fresh one. Nothing in here
//! ends the loop except the optional cycle limit.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sensor::{PoseSource, SensorError};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::{controller, FrameBuffer, RigContext, RigStatus, StepOutcome};

/// Shortest pause between cycles, however late the cycle ran.
pub const MIN_SLEEP: Duration = Duration::from_millis(50);

pub const DEFAULT_FPS: u32 = 15;

/// Delay after a cycle that took `elapsed`: `max(MIN_SLEEP, 1/fps - elapsed)`.
pub fn pacing_delay(elapsed: Duration, target_fps: u32) -> Duration {
    if target_fps == 0 {
        return MIN_SLEEP;
    }
    let period = Duration::from_secs_f64(1.0 / f64::from(target_fps));
    period.saturating_sub(elapsed).max(MIN_SLEEP)
}

/// Lifecycle of the pose source.
///
/// `Uninitialized -> Ready` on a successful build, `Ready -> Failed` on any
/// fault, and `Failed -> Uninitialized` at the start of the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Uninitialized,
    Ready,
    Failed,
}

/// Builds pose sources on demand.
#[async_trait]
pub trait SourceFactory: Send {
    async fn build(&mut self) -> Result<Box<dyn PoseSource>, SensorError>;
}

#[async_trait]
impl<F, Fut> SourceFactory for F
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<Box<dyn PoseSource>, SensorError>> + Send + 'static,
{
    async fn build(&mut self) -> Result<Box<dyn PoseSource>, SensorError> {
        (self)().await
    }
}

pub struct Supervisor<F> {
    factory: F,
    context: RigContext,
    target_fps: u32,
    source: Option<Box<dyn PoseSource>>,
    state: SourceState,
    frames: FrameBuffer,
    status: RigStatus,
    status_tx: watch::Sender<RigStatus>,
}

impl<F: SourceFactory> Supervisor<F> {
    pub fn new(factory: F, context: RigContext) -> Self {
        let (pan, tilt) = context.angles();
        let status = RigStatus::new(pan, tilt);
        let (status_tx, _) = watch::channel(status.clone());
        Self {
            factory,
            context,
            target_fps: DEFAULT_FPS,
            source: None,
            state: SourceState::Uninitialized,
            frames: FrameBuffer::new(),
            status,
            status_tx,
        }
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Share `frames` with whoever serves them.
    pub fn with_frames(mut self, frames: FrameBuffer) -> Self {
        self.frames = frames;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<RigStatus> {
        self.status_tx.subscribe()
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn status(&self) -> &RigStatus {
        &self.status
    }

    pub fn context(&self) -> &RigContext {
        &self.context
    }

    /// Run cycles at the target rate, forever or until `cycles` have run.
    pub async fn run(&mut self, cycles: Option<u64>) {
        info!(fps = self.target_fps, "tracking loop started");
        let mut done = 0u64;
        loop {
            let start = Instant::now();
            self.cycle().await;
            done += 1;
            if cycles.is_some_and(|limit| done >= limit) {
                break;
            }
            time::sleep(pacing_delay(start.elapsed(), self.target_fps)).await;
        }
        if let Some(mut source) = self.source.take() {
            source.close().await;
        }
        info!(cycles = done, "tracking loop stopped");
    }

    /// One iteration without the pacing sleep.
    pub async fn cycle(&mut self) {
        self.status.cycles += 1;
        if self.state == SourceState::Failed {
            self.state = SourceState::Uninitialized;
        }
        match self.ensure_source().await {
            Ok(()) => self.track().await,
            Err(e) => {
                error!(error = %e, "failed to initialize pose source");
                self.teardown().await;
            }
        }
        self.publish();
    }

    async fn ensure_source(&mut self) -> Result<(), SensorError> {
        if self.source.is_none() {
            let source = self.factory.build().await?;
            info!(source = source.describe(), "pose source initialized");
            self.source = Some(source);
            self.state = SourceState::Ready;
        }
        Ok(())
    }

    async fn track(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let name = source.describe();
        let mut detection = match source.next_detection().await {
            Ok(detection) => detection,
            Err(e) => {
                warn!(source = name, error = %e, "pose source fault, restarting");
                self.teardown().await;
                return;
            }
        };

        if let Some(frame) = detection.frame.take() {
            self.frames.publish(frame.into_bytes()).await;
        }
        let pose = detection.into_pose();
        self.status.hand_visible = pose.hand.is_some();

        match controller::step(&mut self.context, &pose).await {
            Ok(outcome) => {
                if let StepOutcome::Moved { pan, tilt } = outcome {
                    debug!(pan, tilt, "servos moved");
                }
                self.status.last_step = Some(outcome);
            }
            Err(e) => {
                self.status.servo_errors += 1;
                warn!(error = %e, "servo error");
            }
        }
    }

    async fn teardown(&mut self) {
        self.state = SourceState::Failed;
        if let Some(mut source) = self.source.take() {
            source.close().await;
        }
        self.status.restarts += 1;
    }

    fn publish(&mut self) {
        let (pan, tilt) = self.context.angles();
        self.status.pan = pan;
        self.status.tilt = tilt;
        self.status.source = self.state;
        self.status_tx.send_replace(self.status.clone());
    }
}
