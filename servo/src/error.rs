use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServoError {
    #[error("angle {0} is outside the supported range 0..=180")]
    OutOfRange(f32),

    #[error("invalid pulse width range {min_us}..{max_us} us")]
    InvalidPulseRange { min_us: u32, max_us: u32 },

    #[error("servo I/O error: {0}")]
    Io(#[from] std::io::Error),
}
