//! 响应分类：根据 HTTP 状态码和负载中的错误信息判定结果类别。
//!
//! Response classification.
//!
//! Rule order (first match wins):
//! 1. HTTP 401 / 403 → [`Outcome::AuthExpired`]
//! 2. first payload error message contains `"token"` or `"auth"` → [`Outcome::AuthExpired`]
//! 3. non-empty payload error list → [`Outcome::GenericFailure`]
//! 4. otherwise → [`Outcome::Success`] with `data`
//!
//! Rule 2 is a substring heuristic on human-readable text and is case-sensitive: a
//! backend saying "Authentication failed" does not match. It stays as a fallback until the
//! backend reports a typed error code.

use serde_json::Value;

/// Used when the first payload error carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

const AUTH_HINTS: &[&str] = &["token", "auth"];

/// Recovery-relevant category of one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    AuthExpired,
    GenericFailure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

pub fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

/// Whether an error text looks like an expired/invalid credential.
pub fn mentions_auth(message: &str) -> bool {
    AUTH_HINTS.iter().any(|hint| message.contains(hint))
}

/// Classify an HTTP status and (possibly null) JSON payload. Pure.
pub fn classify(status: u16, payload: &Value) -> Outcome {
    if is_auth_status(status) {
        return Outcome::AuthExpired;
    }

    if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(UNKNOWN_ERROR_MESSAGE);
            if mentions_auth(message) {
                return Outcome::AuthExpired;
            }
            return Outcome::GenericFailure(message.to_string());
        }
    }

    Outcome::Success(payload.get("data").cloned().unwrap_or(Value::Null))
}
