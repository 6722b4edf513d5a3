use std::path::PathBuf;

use anyhow::Context;
use sensor::{HelperCommand, PoseSource, ProcessSource, ReplaySource, SensorError, TrackerOptions};
use servo::{LoggingServo, Servo, SimServo, SysfsPwmServo};
use tracker::SourceFactory;

use crate::{RigArgs, ServoKind};

/// How to build a pose source. Cloned into every rebuild.
#[derive(Clone, Debug)]
pub enum RigSource {
    Process {
        command: HelperCommand,
        options: TrackerOptions,
    },
    Replay {
        path: PathBuf,
    },
}

impl RigSource {
    pub async fn build(&self) -> Result<Box<dyn PoseSource>, SensorError> {
        match self {
            Self::Process { command, options } => {
                Ok(Box::new(ProcessSource::spawn(command, options)?))
            }
            Self::Replay { path } => Ok(Box::new(ReplaySource::open(path).await?)),
        }
    }

    /// Factory that builds a fresh source from this description each time.
    pub fn into_factory(self) -> impl SourceFactory {
        move || {
            let source = self.clone();
            async move { source.build().await }
        }
    }
}

/// Open the pan and tilt servos selected by `args`, wrapped for logging.
pub async fn build_servos(args: &RigArgs) -> anyhow::Result<(Box<dyn Servo>, Box<dyn Servo>)> {
    match args.servo {
        ServoKind::Sim => Ok((
            Box::new(LoggingServo::new("pan", SimServo::default())),
            Box::new(LoggingServo::new("tilt", SimServo::default())),
        )),
        ServoKind::Sysfs => {
            let pan = SysfsPwmServo::open(&args.pwm_chip, args.pan_channel)
                .await
                .context("opening pan servo")?;
            let tilt = SysfsPwmServo::open(&args.pwm_chip, args.tilt_channel)
                .await
                .context("opening tilt servo")?;
            Ok((
                Box::new(LoggingServo::new("pan", pan)),
                Box::new(LoggingServo::new("tilt", tilt)),
            ))
        }
    }
}
