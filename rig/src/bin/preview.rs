//! Desktop preview: draws detected hand landmarks onto each frame.
//!
//! Runs the detector helper with frames attached (or replays a recording) and
//! overwrites `--output` with the annotated image every cycle.
//!
//! ```bash
//! cargo run -p rig --bin preview -- --output hands.png
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rig::preview::annotate;
use rig::{RigSource, init_logging};
use sensor::{HelperCommand, TrackerOptions};
use tracing::{debug, info};
use tracker::pacing_delay;

#[derive(Parser)]
#[command(author, version, about = "Draw hand landmarks onto camera frames")]
struct Cli {
    /// Detector helper script, run with python3
    #[arg(long, env = "RIG_HELPER", default_value = "hand_helper.py")]
    helper: String,

    /// Replay a recording instead of running the helper
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Where the annotated frame is written
    #[arg(long, default_value = "preview.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Stop after this many frames
    #[arg(long)]
    cycles: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let source = match cli.replay {
        Some(path) => RigSource::Replay { path },
        None => RigSource::Process {
            command: HelperCommand::python(cli.helper),
            options: TrackerOptions::desktop(),
        },
    };
    let mut source = source.build().await.context("starting pose source")?;

    let mut frames = 0u64;
    loop {
        let start = Instant::now();
        let detection = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            detection = source.next_detection() => detection?,
        };
        match annotate(&detection)? {
            Some(image) => image
                .save(&cli.output)
                .with_context(|| format!("writing {}", cli.output.display()))?,
            None => {
                for (i, hand) in detection.hands.iter().enumerate() {
                    for (idx, lm) in hand.landmarks.iter().enumerate() {
                        debug!(hand = i, landmark = idx, x = lm.x, y = lm.y, z = lm.z, "landmark");
                    }
                }
            }
        }
        frames += 1;
        if cli.cycles.is_some_and(|limit| frames >= limit) {
            break;
        }
        tokio::time::sleep(pacing_delay(start.elapsed(), cli.fps)).await;
    }
    source.close().await;
    info!(frames, "preview stopped");
    Ok(())
}
