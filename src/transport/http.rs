use crate::{Error, Result};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Proxy;
use std::env;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Status and body of one completed exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub request_id: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport that bounds every call with an abort timer.
///
/// One invocation of [`HttpTransport::send`] performs exactly one network call.
/// There is no retry at this layer.
pub struct HttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpTransport {
    pub fn new(default_timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("LIFF_EDITOR_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("LIFF_EDITOR_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            default_timeout,
        })
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// POST `payload` as JSON to `endpoint`.
    ///
    /// The bearer credential is attached only when given. Fails with [`Error::Timeout`]
    /// when status and body have not both arrived within `timeout` (or the default);
    /// the in-flight request is dropped at that point.
    pub async fn send(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let abort = CancellationToken::new();
        let timer = {
            let abort = abort.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                abort.cancel();
            })
        };

        let outcome = tokio::select! {
            biased;
            r = self.execute(endpoint, payload, bearer, &request_id) => Some(r),
            _ = abort.cancelled() => None,
        };
        timer.abort();

        match outcome {
            Some(Ok(resp)) => {
                info!(
                    http_status = resp.status,
                    request_id = resp.request_id.as_str(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "graphql request completed"
                );
                Ok(resp)
            }
            Some(Err(e)) => Err(e),
            None => {
                info!(
                    request_id = request_id.as_str(),
                    timeout_ms = timeout.as_millis() as u64,
                    "graphql request aborted by timeout"
                );
                Err(Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn execute(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        bearer: Option<&str>,
        request_id: &str,
    ) -> Result<RawResponse> {
        let mut req = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, concat!("liff-editor/", env!("CARGO_PKG_VERSION")))
            .header(REQUEST_ID_HEADER, request_id)
            .json(payload);

        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        debug!(endpoint, request_id, authenticated = bearer.is_some(), "sending graphql request");

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        Ok(RawResponse {
            status,
            body,
            request_id: request_id.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Other(String),
}
