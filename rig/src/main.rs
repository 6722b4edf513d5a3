use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use feed_server::FeedState;
use rig::{RigArgs, build_servos, init_logging};
use tracing::info;
use tracker::{ControlParams, FrameBuffer, RigContext, Supervisor};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();
    let args = RigArgs::parse();

    let (pan, tilt) = build_servos(&args).await?;
    let mut context = RigContext::new(ControlParams::default(), pan, tilt);
    context
        .calibrate(args.pulse_range()?)
        .await
        .context("centring servos")?;

    let frames = FrameBuffer::new();
    let mut supervisor = Supervisor::new(args.pose_source()?.into_factory(), context)
        .with_target_fps(args.fps)
        .with_frames(frames.clone());
    let state = FeedState {
        frames,
        status: supervisor.subscribe(),
    };

    let cycles = args.cycles;
    let tracking = tokio::spawn(async move { supervisor.run(cycles).await });
    let server = tokio::spawn(feed_server::serve(args.addr, state));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
        res = tracking => {
            res.context("tracking task panicked")?;
            info!("tracking finished");
        }
        res = server => {
            res.context("server task panicked")?.context("http server failed")?;
        }
    }
    Ok(())
}
