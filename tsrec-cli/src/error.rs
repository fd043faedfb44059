use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(#[from] tsrec_engine::CaptureError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
