use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sensor::{HelperCommand, TrackerOptions};
use servo::PulseRange;
use servo::sysfs::DEFAULT_CHIP;
use tracker::supervisor::DEFAULT_FPS;

use crate::RigSource;

/// Where poses come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Run the detector helper and read its output
    Process,
    /// Replay a recorded NDJSON file
    Replay,
}

/// Which servo backend to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServoKind {
    /// In-memory servos that only log
    Sim,
    /// Linux sysfs PWM channels
    Sysfs,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Pan/tilt rig that keeps a detected hand centred in frame")]
pub struct RigArgs {
    /// Address to bind the HTTP server
    #[arg(long, env = "RIG_ADDR", default_value = "0.0.0.0:5000")]
    pub addr: SocketAddr,

    /// Where poses come from
    #[arg(long, env = "RIG_SOURCE", value_enum, default_value_t = SourceKind::Process)]
    pub source: SourceKind,

    /// Detector helper script, run with python3
    #[arg(long, env = "RIG_HELPER", default_value = "hand_helper.py")]
    pub helper: String,

    /// Recording to replay with `--source replay`
    #[arg(long, env = "RIG_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Milliseconds to wait for a detection before restarting the source
    #[arg(long, env = "RIG_READ_TIMEOUT_MS", default_value_t = 2000)]
    pub read_timeout_ms: u64,

    /// Servo backend
    #[arg(long, env = "RIG_SERVO", value_enum, default_value_t = ServoKind::Sim)]
    pub servo: ServoKind,

    /// PWM chip directory for `--servo sysfs`
    #[arg(long, env = "RIG_PWM_CHIP", default_value = DEFAULT_CHIP)]
    pub pwm_chip: PathBuf,

    #[arg(long, env = "RIG_PAN_CHANNEL", default_value_t = 0)]
    pub pan_channel: u32,

    #[arg(long, env = "RIG_TILT_CHANNEL", default_value_t = 1)]
    pub tilt_channel: u32,

    /// Pulse width for 0 degrees, in microseconds
    #[arg(long, default_value_t = 500)]
    pub min_pulse_us: u32,

    /// Pulse width for 180 degrees, in microseconds
    #[arg(long, default_value_t = 2500)]
    pub max_pulse_us: u32,

    /// Target tracking rate
    #[arg(long, env = "RIG_FPS", default_value_t = DEFAULT_FPS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Stop after this many cycles instead of running until killed
    #[arg(long)]
    pub cycles: Option<u64>,
}

impl RigArgs {
    pub fn pulse_range(&self) -> anyhow::Result<PulseRange> {
        Ok(PulseRange::new(self.min_pulse_us, self.max_pulse_us)?)
    }

    pub fn helper_command(&self) -> HelperCommand {
        HelperCommand::python(self.helper.clone())
            .read_timeout(Duration::from_millis(self.read_timeout_ms))
    }

    /// The pose source selected on the command line.
    pub fn pose_source(&self) -> anyhow::Result<RigSource> {
        match self.source {
            SourceKind::Process => Ok(RigSource::Process {
                command: self.helper_command(),
                options: TrackerOptions::edge(),
            }),
            SourceKind::Replay => {
                let path = self
                    .replay
                    .clone()
                    .context("--replay is required with --source replay")?;
                Ok(RigSource::Replay { path })
            }
        }
    }
}
