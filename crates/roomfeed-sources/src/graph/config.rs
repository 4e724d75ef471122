//! Microsoft Graph source configuration.

use std::fmt;
use std::time::Duration;

/// Default Graph API base URL.
pub const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Default Microsoft identity platform authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Scope requested for the access token.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Account credentials for the resource-owner password grant.
///
/// The account must have read access to every room mailbox it is asked
/// about.
#[derive(Clone)]
pub struct GraphCredentials {
    pub username: String,
    pub password: String,
    /// Azure AD tenant (directory) id.
    pub tenant_id: String,
    /// Application (client) id of the app registration.
    pub client_id: String,
}

impl GraphCredentials {
    /// Creates new credentials.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Checks that no field is blank.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.tenant_id.trim().is_empty() {
            return Err("tenant_id is required");
        }
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        Ok(())
    }
}

impl fmt::Debug for GraphCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Configuration for the Graph source client.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub credentials: GraphCredentials,
    /// Base URL of the Graph API, without trailing slash.
    pub api_base: String,
    /// Identity platform authority, without trailing slash.
    pub authority: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl GraphConfig {
    /// Creates a configuration with default endpoints and a 30 second
    /// request timeout.
    pub fn new(credentials: GraphCredentials) -> Self {
        Self {
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to override the authority.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        self.credentials.validate()?;
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero");
        }
        Ok(())
    }

    /// Token endpoint for the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority, self.credentials.tenant_id
        )
    }
}
