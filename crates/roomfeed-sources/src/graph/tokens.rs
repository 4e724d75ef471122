//! Access tokens for the Graph API.
//!
//! Tokens come from the resource-owner password grant and are kept in
//! memory only. A token is considered expired 60 seconds before the
//! identity platform says so.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};

use super::config::{GRAPH_SCOPE, GraphConfig};

const EXPIRY_BUFFER_SECS: i64 = 60;

/// An access token with its expiry.
#[derive(Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenInfo {
    /// Creates token info from a token response.
    pub fn new(access_token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        Self::issued_at(access_token, expires_in_secs, Utc::now())
    }

    fn issued_at(
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = expires_in_secs
            .map(|secs| now + Duration::seconds(secs) - Duration::seconds(EXPIRY_BUFFER_SECS));
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Returns true if the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Requests a new access token with the password grant.
pub(crate) async fn acquire_token(
    http_client: &reqwest::Client,
    config: &GraphConfig,
) -> SourceResult<TokenInfo> {
    let creds = &config.credentials;
    let params = [
        ("client_id", creds.client_id.as_str()),
        ("scope", GRAPH_SCOPE),
        ("username", creds.username.as_str()),
        ("password", creds.password.as_str()),
        ("grant_type", "password"),
    ];

    debug!(tenant = %creds.tenant_id, "requesting Graph access token");

    let response = http_client
        .post(config.token_url())
        .form(&params)
        .send()
        .await
        .map_err(|e| {
            SourceError::unavailable(format!("token request failed: {}", e)).with_cause(e)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SourceError::unavailable(format!("failed to read token response: {}", e)))?;

    if status.is_server_error() {
        return Err(SourceError::unavailable(format!(
            "token endpoint error ({})",
            status
        )));
    }

    if !status.is_success() {
        return Err(SourceError::auth_failure(format!(
            "token request rejected ({}): {}",
            status,
            error_description(&body)
        )));
    }

    let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        SourceError::unavailable(format!("invalid token response: {}", e)).with_cause(e)
    })?;

    info!("obtained Graph access token");
    Ok(TokenInfo::new(
        token_response.access_token,
        token_response.expires_in,
    ))
}

/// Pulls `error_description` out of an OAuth error body, falling back to
/// the raw body.
fn error_description(body: &str) -> String {
    #[derive(Deserialize)]
    struct OAuthError {
        error_description: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<OAuthError>(body) {
        Ok(OAuthError {
            error_description: Some(description),
            ..
        }) => description,
        Ok(OAuthError {
            error: Some(error), ..
        }) => error,
        _ => body.to_string(),
    }
}
