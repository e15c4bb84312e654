use std::io::Error as IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionSourceError {
    #[error("position stream ended")]
    Exhausted,

    #[error("unreadable position fix: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] IoError),
}
