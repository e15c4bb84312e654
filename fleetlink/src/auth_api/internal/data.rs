use serde::Deserialize;
use time::Duration;

use crate::auth_api::AuthApiError;
use crate::data::{Identity, TokenGrant};
use crate::model::UserRecord;

#[derive(Deserialize)]
pub(super) struct Envelope<T> {
    pub data: T,
}

#[derive(Deserialize)]
pub(super) struct TokenGrantData {
    pub access_token: String,
    pub refresh_token: String,
    // ttl in milliseconds
    pub expires: i64,
}

pub(super) fn parse_token_grant(
    body: &str,
) -> Result<TokenGrant, AuthApiError> {
    let envelope: Envelope<TokenGrantData> = serde_json::from_str(body)?;
    let data = envelope.data;
    Ok(TokenGrant {
        access_token: data.access_token,
        refresh_token: data.refresh_token,
        ttl: Duration::milliseconds(data.expires),
    })
}

pub(super) fn parse_identity(body: &str) -> Result<Identity, AuthApiError> {
    let envelope: Envelope<UserRecord> = serde_json::from_str(body)?;
    Ok(envelope.data.into())
}
