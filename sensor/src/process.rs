//! Pose source backed by an external detector process.
//!
//! The helper owns the camera and the landmark model. It prints one JSON
//! detection per line on stdout and keeps running until killed.
//!
//! # Helper contract
//!
//! The helper is started as `<program> <args..> <tracker options..>`, where
//! the tracker options come from [`TrackerOptions::to_args`]:
//!
//! ```text
//! --input-mode rgb_laconic --lm-model sparse --lm-score-thresh 0.8
//! --min-detection-confidence 0.7 --min-tracking-confidence 0.7
//! --max-hands 1 --internal-fps 15 --resolution full
//! --internal-frame-height 480 [--solo] [--crop] [--gesture] [--xyz] [--frames]
//! ```
//!
//! The bracketed switches are only passed when enabled. Each line the helper
//! writes to stdout is one of:
//!
//! ```text
//! {"width":640,"height":480,"hands":[{"landmarks":[[x,y],[x,y,z],{"x":..,"y":..}],
//!   "handedness":"right","score":0.93}],"frame":"<base64 jpeg>"}
//! {"error":"camera disconnected"}
//! ```
//!
//! Landmarks are pixel coordinates in MediaPipe hand order (21 points, wrist
//! first, index 9 is the middle finger base). `handedness`, `score`, and
//! `frame` are optional; `frame` is only expected with `--frames`. An
//! `error` line is a detector fault and restarts the source. Blank lines are
//! ignored. A helper that stays silent past the read timeout, or closes
//! stdout, is treated as failed.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::time;
use tracing::{debug, info, warn};

use crate::pose::parse_line;
use crate::{Detection, PoseSource, SensorError, TrackerOptions};

/// How long to wait for a single detection before giving up on the helper.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// How to launch the helper.
#[derive(Clone, Debug, PartialEq)]
pub struct HelperCommand {
    pub program: String,
    /// Arguments placed before the rendered [`TrackerOptions`].
    pub args: Vec<String>,
    pub read_timeout: Duration,
}

impl HelperCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Run a Python helper script with `python3`.
    pub fn python(script: impl Into<String>) -> Self {
        Self::new("python3").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Reads detections from a running helper process.
pub struct ProcessSource {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    read_timeout: Duration,
}

impl ProcessSource {
    /// Launch the helper with `options` appended to its arguments.
    pub fn spawn(command: &HelperCommand, options: &TrackerOptions) -> Result<Self, SensorError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .args(options.to_args())
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SensorError::Spawn(format!("{}: {e}", command.program)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SensorError::Spawn("helper stdout was not captured".into()))?;

        info!(pid = ?child.id(), program = %command.program, "pose helper started");

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
            read_timeout: command.read_timeout,
        })
    }

    /// Whether the helper is still alive.
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!(%status, "pose helper exited");
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to poll pose helper");
                false
            }
        }
    }
}

#[async_trait]
impl PoseSource for ProcessSource {
    async fn next_detection(&mut self) -> Result<Detection, SensorError> {
        loop {
            let line = match time::timeout(self.read_timeout, self.lines.next_line()).await {
                Err(_) => return Err(SensorError::Timeout(self.read_timeout)),
                Ok(Err(e)) => return Err(SensorError::Io(e)),
                Ok(Ok(None)) => return Err(SensorError::Closed),
                Ok(Ok(Some(line))) => line,
            };
            if line.trim().is_empty() {
                continue;
            }
            debug!(bytes = line.len(), "helper line");
            return parse_line(&line);
        }
    }

    async fn close(&mut self) {
        if !self.is_running() {
            return;
        }
        info!(pid = ?self.child.id(), "stopping pose helper");
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "pose helper already gone");
        }
    }

    fn describe(&self) -> &'static str {
        "helper process"
    }
}
