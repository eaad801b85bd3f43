use crate::client::core::EditorClient;
use crate::config::{effective_timeout, EditorConfig, UiDelays};
use crate::session::{HostPage, IdentityProvider, InMemoryHost, SessionContext};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Builder for [`EditorClient`].
///
/// Without an explicit configuration the builder loads one from the environment.
pub struct EditorClientBuilder {
    config: Option<EditorConfig>,
    provider: Option<Arc<dyn IdentityProvider>>,
    host: Option<Arc<dyn HostPage>>,
    session: Option<Arc<SessionContext>>,
    graphql_url_override: Option<String>,
    fetch_timeout_override: Option<Duration>,
    delays_override: Option<UiDelays>,
}

impl EditorClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            provider: None,
            host: None,
            session: None,
            graphql_url_override: None,
            fetch_timeout_override: None,
            delays_override: None,
        }
    }

    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Identity provider. Leaving it unset models an SDK that failed to load.
    pub fn provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostPage>) -> Self {
        self.host = Some(host);
        self
    }

    /// Reuse an existing session context; `provider` and `host` are then ignored.
    pub fn session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    /// Override the GraphQL endpoint (primarily for testing with mock servers).
    pub fn graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url_override = Some(url.into());
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_override = Some(timeout);
        self
    }

    pub fn delays(mut self, delays: UiDelays) -> Self {
        self.delays_override = Some(delays);
        self
    }

    pub fn build(self) -> Result<EditorClient> {
        let mut config = match self.config {
            Some(config) => config,
            None => EditorConfig::from_env()?,
        };
        if let Some(url) = self.graphql_url_override {
            config.graphql_url = url;
        }
        if let Some(timeout) = self.fetch_timeout_override {
            config.fetch_timeout = timeout;
        }
        config.fetch_timeout = effective_timeout(config.fetch_timeout);
        if let Some(delays) = self.delays_override {
            config.delays = delays;
        }
        config.validate()?;

        let session = match self.session {
            Some(session) => session,
            None => {
                let host = self
                    .host
                    .unwrap_or_else(|| Arc::new(InMemoryHost::default()) as Arc<dyn HostPage>);
                Arc::new(SessionContext::new(self.provider, host, config.liff_id.clone()))
            }
        };

        let transport = Arc::new(crate::transport::HttpTransport::new(config.fetch_timeout)?);

        Ok(EditorClient {
            config,
            transport,
            session,
            fetch_gate: Semaphore::new(1),
        })
    }
}

impl Default for EditorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
