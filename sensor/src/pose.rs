use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Landmark used as the tracked position of a hand (base of the middle
/// finger, the most stable point of the palm).
pub const ANCHOR_LANDMARK: usize = 9;

/// Number of landmarks in a full hand.
pub const HAND_LANDMARKS: usize = 21;

/// Edges of the 21-point hand skeleton, as landmark index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // middle
    (9, 10),
    (10, 11),
    (11, 12),
    // ring
    (13, 14),
    (14, 15),
    (15, 16),
    // pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    // palm
    (5, 9),
    (9, 13),
    (13, 17),
];

/// A single landmark in frame-pixel coordinates.
///
/// Deserializes from `[x, y]`, `[x, y, z]` or `{"x":..,"y":..,"z":..}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; zero when the detector has none.
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Planar([f32; 2]),
    Spatial([f32; 3]),
    Named {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Planar([x, y]) => Self { x, y, z: 0.0 },
            LandmarkRepr::Spatial([x, y, z]) => Self { x, y, z },
            LandmarkRepr::Named { x, y, z } => Self { x, y, z },
        }
    }
}

/// One detected hand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            ..Self::default()
        }
    }

    /// A full hand whose every landmark sits at `point`.
    pub fn at(point: Landmark) -> Self {
        Self::new(vec![point; HAND_LANDMARKS])
    }

    /// The anchor landmark, if the hand carries enough points.
    pub fn anchor(&self) -> Option<Landmark> {
        self.landmarks.get(ANCHOR_LANDMARK).copied()
    }
}

/// Width and height of the source image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The point the rig tries to keep the hand on.
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Everything the detector reports for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub hands: Vec<Hand>,
    /// Base64 encoded image, only sent when frames were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl Detection {
    /// A detection with no hands in it.
    pub fn empty(size: FrameSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            hands: Vec::new(),
            frame: None,
        }
    }

    pub fn with_hand(size: FrameSize, hand: Hand) -> Self {
        Self {
            hands: vec![hand],
            ..Self::empty(size)
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Reduce to the single hand the rig follows: the first one carrying an
    /// anchor landmark.
    pub fn into_pose(self) -> Pose {
        let frame = self.frame_size();
        let hand = self
            .hands
            .into_iter()
            .find(|hand| hand.anchor().is_some());
        Pose { frame, hand }
    }
}

/// The solo-mode view of a detection: at most one usable hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub frame: FrameSize,
    pub hand: Option<Hand>,
}

impl Pose {
    pub fn anchor(&self) -> Option<Landmark> {
        self.hand.as_ref().and_then(Hand::anchor)
    }
}

/// A line of helper output: either a detection or a reported fault.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HelperLine {
    Fault { error: String },
    Detection(Detection),
}

/// Parse one line of helper output.
///
/// A line of the form `{"error": "..."}` is the helper reporting a detector
/// fault and becomes [`SensorError::Runtime`].
pub fn parse_line(line: &str) -> Result<Detection, SensorError> {
    match serde_json::from_str::<HelperLine>(line)? {
        HelperLine::Detection(detection) => Ok(detection),
        HelperLine::Fault { error } => Err(SensorError::Runtime(error)),
    }
}
