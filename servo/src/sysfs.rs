//! Servo on a Linux PWM channel exposed through `/sys/class/pwm`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::{check_angle, PulseRange, Servo, ServoError, CENTER_ANGLE};

/// 50 Hz frame expected by hobby servos.
pub const PERIOD_NS: u64 = 20_000_000;

pub const DEFAULT_CHIP: &str = "/sys/class/pwm/pwmchip0";

pub struct SysfsPwmServo {
    channel_dir: PathBuf,
    range: PulseRange,
    angle: f32,
}

impl SysfsPwmServo {
    /// Export `channel` on `chip` if needed, set the 20 ms period and enable
    /// the output. The servo is assumed to sit at the centre until the first
    /// [`Servo::set_angle`].
    pub async fn open(chip: impl AsRef<Path>, channel: u32) -> Result<Self, ServoError> {
        let chip = chip.as_ref();
        let channel_dir = chip.join(format!("pwm{channel}"));
        if !fs::try_exists(&channel_dir).await? {
            fs::write(chip.join("export"), channel.to_string()).await?;
        }
        fs::write(channel_dir.join("period"), PERIOD_NS.to_string()).await?;
        fs::write(channel_dir.join("enable"), "1").await?;
        info!(channel = %channel_dir.display(), "pwm servo enabled");
        Ok(Self {
            channel_dir,
            range: PulseRange::default(),
            angle: CENTER_ANGLE,
        })
    }

    async fn write_pulse(&self, pulse_us: u32) -> Result<(), ServoError> {
        let duty_ns = u64::from(pulse_us) * 1_000;
        fs::write(self.channel_dir.join("duty_cycle"), duty_ns.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl Servo for SysfsPwmServo {
    fn angle(&self) -> f32 {
        self.angle
    }

    async fn set_angle(&mut self, degrees: f32) -> Result<(), ServoError> {
        let degrees = check_angle(degrees)?;
        self.write_pulse(self.range.pulse_for(degrees)).await?;
        self.angle = degrees;
        Ok(())
    }

    async fn set_pulse_width_range(&mut self, range: PulseRange) -> Result<(), ServoError> {
        self.range = PulseRange::new(range.min_us, range.max_us)?;
        Ok(())
    }
}
