use std::path::{Path, PathBuf};
use async_trait::async_trait;
use log::{debug, trace, warn};
use time::OffsetDateTime;

use crate::data::TokenPair;
use crate::lib_constants::{
    ACCESS_TOKEN_FILE,
    REFRESH_TOKEN_FILE,
    TOKEN_EXPIRES_FILE,
};
use crate::token_store::{TokenStore, TokenStoreError};
use crate::token_store::internal::io_trait::{
    ProductionTokenStoreIo,
    TokenStoreIo,
};

mod io_trait;
#[cfg(test)] mod tests;

pub type ProductionTokenStore = TokenStoreImpl<ProductionTokenStoreIo>;

#[allow(private_bounds)]
#[derive(Debug)]
pub struct TokenStoreImpl<Io: TokenStoreIo> {
    io: Io,
    state_directory: PathBuf,
}

impl ProductionTokenStore {
    pub fn new(state_directory: impl AsRef<Path>) -> ProductionTokenStore {
        TokenStoreImpl::new_impl(
            ProductionTokenStoreIo,
            state_directory.as_ref().to_path_buf(),
        )
    }
}

#[allow(private_bounds)]
impl<Io: TokenStoreIo> TokenStoreImpl<Io> {
    fn new_impl(io: Io, state_directory: PathBuf) -> TokenStoreImpl<Io> {
        TokenStoreImpl { io, state_directory }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.state_directory.join(key)
    }
}

#[async_trait]
impl<Io: TokenStoreIo> TokenStore for TokenStoreImpl<Io> {
    async fn load(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        let access_token = self.io
            .read_key(&self.key_path(ACCESS_TOKEN_FILE))
            .await?;
        let refresh_token = self.io
            .read_key(&self.key_path(REFRESH_TOKEN_FILE))
            .await?;
        let expires = self.io
            .read_key(&self.key_path(TOKEN_EXPIRES_FILE))
            .await?;
        let (access_token, refresh_token, expires) =
            match (access_token, refresh_token, expires) {
                (Some(access), Some(refresh), Some(expires)) =>
                    (access, refresh, expires),
                (None, None, None) => {
                    trace!("no persisted session");
                    return Ok(None);
                },
                _ => {
                    warn!(
                        "partial token keys on disk, \
                            treating the session as absent"
                    );
                    return Ok(None);
                },
            };
        let Some(expires_at) = parse_expiry(expires.trim()) else {
            warn!(
                "unreadable token expiry on disk, \
                    treating the session as absent"
            );
            return Ok(None);
        };
        trace!("loaded a persisted session expiring at {expires_at}");
        Ok(Some(TokenPair {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    async fn store(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        debug!(
            "persisting the session tokens under {}",
            self.state_directory.display(),
        );
        self.io.create_state_directory(&self.state_directory).await?;
        self.io
            .write_key(
                &self.key_path(ACCESS_TOKEN_FILE),
                &tokens.access_token,
            )
            .await?;
        self.io
            .write_key(
                &self.key_path(REFRESH_TOKEN_FILE),
                &tokens.refresh_token,
            )
            .await?;
        self.io
            .write_key(
                &self.key_path(TOKEN_EXPIRES_FILE),
                &epoch_millis(tokens.expires_at).to_string(),
            )
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        debug!("clearing the persisted session tokens");
        // attempt all three even if one fails, then report the first error
        let results = [
            self.io.remove_key(&self.key_path(ACCESS_TOKEN_FILE)).await,
            self.io.remove_key(&self.key_path(REFRESH_TOKEN_FILE)).await,
            self.io.remove_key(&self.key_path(TOKEN_EXPIRES_FILE)).await,
        ];
        for result in results {
            result?;
        }
        Ok(())
    }
}

fn epoch_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

fn parse_expiry(raw: &str) -> Option<OffsetDateTime> {
    let millis: i64 = raw.parse().ok()?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
}
