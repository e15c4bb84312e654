use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceApiError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("resource endpoint returned status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed resource endpoint response: {0}")]
    Malformed(#[from] serde_json::Error),
}
