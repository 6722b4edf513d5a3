use serde::{Deserialize, Serialize};

/// Construction parameters for the external hand detector.
///
/// These are handed to the helper verbatim; nothing in this workspace
/// interprets them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerOptions {
    /// Camera input mode understood by the helper, e.g. `rgb_laconic`.
    pub input_mode: String,
    /// Landmark model flavour (`lite`, `full`, `sparse`).
    pub landmark_model: String,
    pub landmark_score_threshold: f32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// Track a single hand only.
    pub solo: bool,
    pub max_hands: u32,
    pub internal_fps: u32,
    pub resolution: String,
    pub crop: bool,
    pub internal_frame_height: u32,
    pub gestures: bool,
    /// Spatial (depth) coordinates for each landmark.
    pub depth: bool,
    /// Attach encoded frames to each detection.
    pub frames: bool,
}

impl TrackerOptions {
    /// Settings used on the rig: one hand, no frames, no gestures, no depth.
    pub fn edge() -> Self {
        Self {
            input_mode: "rgb_laconic".into(),
            landmark_model: "sparse".into(),
            landmark_score_threshold: 0.8,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
            solo: true,
            max_hands: 1,
            internal_fps: 15,
            resolution: "full".into(),
            crop: true,
            internal_frame_height: 480,
            gestures: false,
            depth: false,
            frames: false,
        }
    }

    /// Settings for the desktop preview: up to two hands with frames attached.
    pub fn desktop() -> Self {
        Self {
            input_mode: "rgb".into(),
            landmark_model: "full".into(),
            solo: false,
            max_hands: 2,
            frames: true,
            ..Self::edge()
        }
    }

    /// Render as command line arguments for the helper process.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--input-mode".to_string(),
            self.input_mode.clone(),
            "--lm-model".to_string(),
            self.landmark_model.clone(),
            "--lm-score-thresh".to_string(),
            self.landmark_score_threshold.to_string(),
            "--min-detection-confidence".to_string(),
            self.min_detection_confidence.to_string(),
            "--min-tracking-confidence".to_string(),
            self.min_tracking_confidence.to_string(),
            "--max-hands".to_string(),
            self.max_hands.to_string(),
            "--internal-fps".to_string(),
            self.internal_fps.to_string(),
            "--resolution".to_string(),
            self.resolution.clone(),
            "--internal-frame-height".to_string(),
            self.internal_frame_height.to_string(),
        ];
        let flags = [
            (self.solo, "--solo"),
            (self.crop, "--crop"),
            (self.gestures, "--gesture"),
            (self.depth, "--xyz"),
            (self.frames, "--frames"),
        ];
        args.extend(
            flags
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );
        args
    }
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self::edge()
    }
}
