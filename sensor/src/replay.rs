use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::pose::parse_line;
use crate::{Detection, FrameSize, PoseSource, SensorError};

/// Replays a recording of helper output, looping at the end.
///
/// Recorded `{"error": ..}` lines are replayed as detector faults.
pub struct ReplaySource {
    entries: Vec<Result<Detection, String>>,
    index: usize,
    frame: FrameSize,
}

impl ReplaySource {
    /// Load a newline-delimited JSON recording from disk.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SensorError> {
        let text = fs::read_to_string(path.as_ref()).await?;
        Self::from_ndjson(&text)
    }

    /// Parse a recording held in memory. Blank lines are skipped.
    pub fn from_ndjson(text: &str) -> Result<Self, SensorError> {
        let mut entries = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match parse_line(line) {
                Ok(detection) => entries.push(Ok(detection)),
                Err(SensorError::Runtime(fault)) => entries.push(Err(fault)),
                Err(e) => return Err(e),
            }
        }
        Ok(Self::from_entries(entries))
    }

    pub fn from_detections(detections: Vec<Detection>) -> Self {
        Self::from_entries(detections.into_iter().map(Ok).collect())
    }

    fn from_entries(entries: Vec<Result<Detection, String>>) -> Self {
        let frame = entries
            .iter()
            .find_map(|e| e.as_ref().ok().map(Detection::frame_size))
            .unwrap_or_default();
        Self {
            entries,
            index: 0,
            frame,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PoseSource for ReplaySource {
    async fn next_detection(&mut self) -> Result<Detection, SensorError> {
        if self.entries.is_empty() {
            return Ok(Detection::empty(self.frame));
        }
        if self.index >= self.entries.len() {
            self.index = 0;
        }
        let entry = self.entries[self.index].clone();
        self.index += 1;
        entry.map_err(SensorError::Runtime)
    }

    fn describe(&self) -> &'static str {
        "replay"
    }
}
