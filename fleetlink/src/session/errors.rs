use thiserror::Error;
use crate::auth_api::AuthApiError;

/// Only sign-in failures reach callers; every other session failure is
/// handled internally and expressed as a transition to the
/// unauthenticated phase.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("credentials rejected")]
    InvalidCredentials,

    #[error("auth endpoint error: {0}")]
    AuthApi(AuthApiError),

    #[error("signed in, but the current user could not be fetched: {0}")]
    IdentityFetch(AuthApiError),

    #[error("superseded by a newer session operation")]
    Superseded,
}
