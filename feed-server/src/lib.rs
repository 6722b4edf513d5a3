//! HTTP side of the rig.
//!
//! `/video_feed` keeps the multipart stream open but never forwards frame
//! bytes; `/health` and `/status` report on the tracking loop.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::stream::{self, Stream};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracker::{FrameBuffer, RigStatus};

pub const FEED_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// How often an idle feed re-checks the frame buffer.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// State shared with every handler.
#[derive(Clone)]
pub struct FeedState {
    pub frames: FrameBuffer,
    pub status: watch::Receiver<RigStatus>,
}

/// Body of the video feed.
///
/// Waits while no frame has been published, then yields one empty chunk per
/// poll interval. Frame forwarding is switched off to keep the CPU free for
/// tracking.
pub fn feed_chunks(frames: FrameBuffer) -> impl Stream<Item = Result<Bytes, Infallible>> {
    stream::unfold(frames, |frames| async move {
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            if frames.has_frame().await {
                break;
            }
        }
        Some((Ok(Bytes::new()), frames))
    })
}

pub async fn video_feed(State(state): State<FeedState>) -> impl IntoResponse {
    info!("video feed client connected");
    (
        [(header::CONTENT_TYPE, FEED_CONTENT_TYPE)],
        Body::from_stream(feed_chunks(state.frames)),
    )
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn status(State(state): State<FeedState>) -> Json<RigStatus> {
    let snapshot = state.status.borrow().clone();
    Json(snapshot)
}

pub fn router(state: FeedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/video_feed", get(video_feed))
        .route("/health", get(health))
        .route("/status", get(status))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve_listener(listener: TcpListener, state: FeedState) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr()?, "feed server listening");
    axum::serve(listener, router(state)).await
}

pub async fn serve(addr: SocketAddr, state: FeedState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, state).await
}
