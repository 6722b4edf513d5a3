use std::sync::Arc;

use tokio::sync::Mutex;

/// Most recent encoded frame, shared between the tracking loop and the HTTP
/// feed. This lock is the only state the two tasks share.
#[derive(Clone, Debug, Default)]
pub struct FrameBuffer {
    latest: Arc<Mutex<Option<Vec<u8>>>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, frame: Vec<u8>) {
        *self.latest.lock().await = Some(frame);
    }

    pub async fn has_frame(&self) -> bool {
        self.latest.lock().await.is_some()
    }
}
