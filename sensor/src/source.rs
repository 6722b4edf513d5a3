use async_trait::async_trait;

use crate::{Detection, Pose, SensorError};

/// Anything that can hand the rig a fresh detection on request.
///
/// A source that returns an error is considered spent: the caller closes and
/// drops it, then builds a new one.
#[async_trait]
pub trait PoseSource: Send {
    /// Wait for the next detection.
    async fn next_detection(&mut self) -> Result<Detection, SensorError>;

    /// Wait for the next detection and keep only the tracked hand.
    async fn next_pose(&mut self) -> Result<Pose, SensorError> {
        Ok(self.next_detection().await?.into_pose())
    }

    /// Release whatever the source holds. Called once before it is dropped.
    async fn close(&mut self) {}

    /// Short human-readable name for logs.
    fn describe(&self) -> &'static str;
}
