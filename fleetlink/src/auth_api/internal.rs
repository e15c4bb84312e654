use async_trait::async_trait;
use log::{debug, trace, warn};
use reqwest::Client;
use serde_json::json;

use crate::auth_api::{AuthApi, AuthApiError};
use crate::data::{Identity, TokenGrant};
use crate::auth_api::internal::data::{parse_identity, parse_token_grant};

mod data;
#[cfg(test)] mod tests;

pub struct ProductionAuthApi {
    http: Client,
    base_url: String,
}

impl ProductionAuthApi {
    pub fn new(http: Client, base_url: &str) -> ProductionAuthApi {
        ProductionAuthApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_token_request(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TokenGrant, AuthApiError> {
        let response = self.http
            .post(self.endpoint(path))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthApiError::Status { status });
        }
        let body = response.text().await?;
        trace!("token response from {path}: {body}");
        parse_token_grant(&body)
    }
}

#[async_trait]
impl AuthApi for ProductionAuthApi {
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, AuthApiError> {
        debug!("submitting credentials for \"{email}\"");
        let response = self.http
            .post(self.endpoint("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let status = response.status();
        if status.is_client_error() {
            warn!("credentials for \"{email}\" rejected with status {status}");
            return Err(AuthApiError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthApiError::Status { status });
        }
        let body = response.text().await?;
        trace!("login response: {body}");
        parse_token_grant(&body)
    }

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<TokenGrant, AuthApiError> {
        debug!("exchanging the refresh token for a new token pair");
        self.post_token_request(
            "/auth/refresh",
            json!({ "refresh_token": refresh_token }),
        ).await
    }

    async fn logout(
        &self,
        refresh_token: &str,
    ) -> Result<(), AuthApiError> {
        debug!("asking the auth endpoint to revoke the refresh token");
        let response = self.http
            .post(self.endpoint("/auth/logout"))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthApiError::Status { status });
        }
        Ok(())
    }

    async fn fetch_identity(
        &self,
        access_token: &str,
    ) -> Result<Identity, AuthApiError> {
        debug!("fetching the current user");
        let response = self.http
            .get(self.endpoint("/users/me"))
            .query(&[("fields", "*,role.name")])
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthApiError::Status { status });
        }
        let body = response.text().await?;
        trace!("current user response: {body}");
        parse_identity(&body)
    }
}
