use std::time::Duration;

use thiserror::Error;

/// Faults raised while acquiring poses.
///
/// Every variant is recoverable by tearing the source down and building a
/// fresh one.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to start pose helper: {0}")]
    Spawn(String),

    #[error("pose source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed detection: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pose helper closed its output")]
    Closed,

    #[error("no detection within {0:?}")]
    Timeout(Duration),

    #[error("detector fault: {0}")]
    Runtime(String),
}
