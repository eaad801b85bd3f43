use crate::transport::TransportError;
use thiserror::Error;

/// Message shown whenever the session guard declines or the backend reports an expired token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please refresh the page and try again.";

/// Message shown when no user id can be resolved for a save.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login through LINE to continue.";

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.graphql_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "save_validator")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse error categories the recovery policy reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ProviderUnavailable,
    NotAuthenticated,
    /// No acting user id; a plain save failure, not a session problem.
    UserUnresolved,
    Timeout,
    TransportError,
    AuthExpired,
    GenericFailure,
    ValidationError,
    Configuration,
    Provider,
    Serialization,
    Io,
}

impl ErrorKind {
    /// Whether recovery goes through the re-authentication confirmation path.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::ProviderUnavailable | ErrorKind::NotAuthenticated | ErrorKind::AuthExpired
        )
    }
}

/// Unified error type for the editor runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Identity provider is not available")]
    ProviderUnavailable,

    #[error("{reason}")]
    NotAuthenticated { reason: String },

    #[error("{message}")]
    UserUnresolved { message: String },

    #[error("Request timeout after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{message}")]
    AuthExpired { message: String },

    #[error("GraphQL error: {message}")]
    GenericFailure { message: String },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Identity provider error: {message}")]
    Provider { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// The session guard declined; a login redirect may already be in progress.
    pub fn session_expired() -> Self {
        Error::NotAuthenticated {
            reason: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }

    /// No user id could be resolved for the current visitor.
    pub fn login_required() -> Self {
        Error::UserUnresolved {
            message: LOGIN_REQUIRED_MESSAGE.to_string(),
        }
    }

    /// The backend rejected the credential (status or payload heuristic).
    pub fn auth_expired() -> Self {
        Error::AuthExpired {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Error::GenericFailure {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            Error::NotAuthenticated { .. } => ErrorKind::NotAuthenticated,
            Error::UserUnresolved { .. } => ErrorKind::UserUnresolved,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Transport(_) => ErrorKind::TransportError,
            Error::AuthExpired { .. } => ErrorKind::AuthExpired,
            Error::GenericFailure { .. } => ErrorKind::GenericFailure,
            Error::Validation { .. } => ErrorKind::ValidationError,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Provider { .. } => ErrorKind::Provider,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_session_error(&self) -> bool {
        self.kind().is_session_error()
    }

    /// User-facing text without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::GenericFailure { message } => message.clone(),
            Error::Validation { message, .. } | Error::Configuration { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
