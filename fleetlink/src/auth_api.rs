mod errors;
mod internal;

use async_trait::async_trait;
use crate::data::{Identity, TokenGrant};

pub use errors::*;
pub use internal::ProductionAuthApi;

/// The backend auth endpoint, behind a seam so the session lifecycle can be
/// exercised without a network.
#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, AuthApiError>;

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<TokenGrant, AuthApiError>;

    async fn logout(
        &self,
        refresh_token: &str,
    ) -> Result<(), AuthApiError>;

    async fn fetch_identity(
        &self,
        access_token: &str,
    ) -> Result<Identity, AuthApiError>;
}
