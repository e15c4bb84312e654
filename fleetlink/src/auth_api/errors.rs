use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("credentials rejected by the auth endpoint")]
    InvalidCredentials,

    #[error("auth endpoint returned status {status}")]
    Status { status: StatusCode },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed auth endpoint response: {0}")]
    Malformed(#[from] serde_json::Error),
}
