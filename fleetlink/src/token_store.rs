mod errors;
mod internal;

use async_trait::async_trait;
use crate::data::TokenPair;

pub use errors::*;
pub use internal::ProductionTokenStore;

/// Durable client-local storage for the session tokens.
///
/// The three keys (access token, refresh token, expiry) are written together
/// and cleared together; a partial set on disk reads back as no session.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<TokenPair>, TokenStoreError>;

    async fn store(&self, tokens: &TokenPair) -> Result<(), TokenStoreError>;

    async fn clear(&self) -> Result<(), TokenStoreError>;
}
