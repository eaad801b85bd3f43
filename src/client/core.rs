use crate::client::classify::{classify, is_auth_status, Outcome};
use crate::config::EditorConfig;
use crate::graphql::GraphQlRequest;
use crate::session::SessionContext;
use crate::transport::{HttpTransport, RawResponse, TransportError};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Session-aware GraphQL client for the message editor.
pub struct EditorClient {
    pub(crate) config: EditorConfig,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) session: Arc<SessionContext>,
    /// Single permit: at most one latest-message fetch in flight.
    pub(crate) fetch_gate: Semaphore,
}

impl EditorClient {
    pub fn builder() -> crate::client::builder::EditorClientBuilder {
        crate::client::builder::EditorClientBuilder::new()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Send one GraphQL operation with the configured timeout.
    ///
    /// The bearer token is attached when the visitor is logged in; this does not run the
    /// session guard. Callers of mutating operations do that first.
    pub async fn graphql_request(&self, request: &GraphQlRequest) -> Result<Value> {
        self.graphql_request_with_timeout(request, None).await
    }

    pub async fn graphql_request_with_timeout(
        &self,
        request: &GraphQlRequest,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let token = self.session.current_token();
        let raw = self
            .transport
            .send(
                &self.config.graphql_url,
                &request.to_payload(),
                token.as_deref(),
                timeout,
            )
            .await?;
        interpret_response(raw)
    }
}

/// Turn a raw exchange into `data` or a classified error.
pub(crate) fn interpret_response(raw: RawResponse) -> Result<Value> {
    if !raw.is_success() && !is_auth_status(raw.status) {
        info!(
            http_status = raw.status,
            request_id = raw.request_id.as_str(),
            "graphql request rejected"
        );
        return Err(Error::Transport(TransportError::Status(raw.status)));
    }

    let payload: Value = if raw.is_success() {
        serde_json::from_str(&raw.body)?
    } else {
        // Auth statuses classify on status alone; the body may not be JSON.
        serde_json::from_str(&raw.body).unwrap_or(Value::Null)
    };

    match classify(raw.status, &payload) {
        Outcome::Success(data) => Ok(data),
        Outcome::AuthExpired => {
            warn!(
                http_status = raw.status,
                request_id = raw.request_id.as_str(),
                "backend reported an expired session"
            );
            Err(Error::auth_expired())
        }
        Outcome::GenericFailure(message) => Err(Error::generic(message)),
    }
}
