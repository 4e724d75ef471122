//! Graph-backed [`SourceClient`].

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::{SourceErrorCode, SourceResult};
use crate::raw_event::RawEvent;
use crate::source::{BoxFuture, FetchRequest, SourceClient};

use super::client::GraphCalendarClient;
use super::config::GraphConfig;
use super::tokens::{TokenInfo, acquire_token};

/// Reads room mailboxes through Microsoft Graph.
///
/// Each source key is a mailbox address. One access token is shared by
/// all fetches and renewed when it expires. A rejected token is dropped
/// and the fetch is retried once with a fresh one.
pub struct GraphSourceClient {
    config: GraphConfig,
    api: GraphCalendarClient,
    token: Mutex<Option<TokenInfo>>,
}

impl GraphSourceClient {
    /// Creates a new Graph source client.
    pub fn new(config: GraphConfig) -> SourceResult<Self> {
        let api = GraphCalendarClient::new(config.api_base.clone(), config.timeout)?;
        Ok(Self {
            config,
            api,
            token: Mutex::new(None),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns a valid access token, requesting a new one if needed.
    ///
    /// The lock is held across the token request so concurrent fetches
    /// wait for a single acquisition.
    async fn access_token(&self) -> SourceResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.clone());
        }

        debug!("access token missing or expired");
        let token = acquire_token(self.api.http_client(), &self.config).await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    #[instrument(skip(self, request), fields(window = ?request.window))]
    async fn fetch(&self, mailbox: &str, request: FetchRequest) -> SourceResult<Vec<RawEvent>> {
        let token = self
            .access_token()
            .await
            .map_err(|e| e.with_source_key(mailbox))?;

        match self.api.calendar_view(&token, mailbox, &request).await {
            Err(e) if e.code() == SourceErrorCode::AuthFailure => {
                warn!(error = %e, "access token rejected, retrying with a new one");
                self.invalidate_token().await;
                let token = self
                    .access_token()
                    .await
                    .map_err(|e| e.with_source_key(mailbox))?;
                self.api.calendar_view(&token, mailbox, &request).await
            }
            result => result,
        }
    }
}

impl SourceClient for GraphSourceClient {
    fn name(&self) -> &str {
        "graph"
    }

    fn fetch_events<'a>(
        &'a self,
        source_key: &'a str,
        request: FetchRequest,
    ) -> BoxFuture<'a, SourceResult<Vec<RawEvent>>> {
        Box::pin(self.fetch(source_key, request))
    }
}
