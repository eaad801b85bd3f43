//! 固定的 GraphQL 文档：最新消息查询与四个消息变更。
//!
//! The fixed operations consumed from the backend.

use super::request::GraphQlRequest;
use serde::{Deserialize, Serialize};

pub const LATEST_MESSAGE_QUERY: &str = r#"
query GetUserLatestMessage($userId: String!) {
  messages(userId: $userId, limit: 1, orderBy: "timestamp", order: "DESC") {
    id
    text
    userId
    timestamp
  }
}
"#;

pub const EDIT_MESSAGE_MUTATION: &str = r#"
mutation EditMessage($messageId: String!, $newText: String!, $userId: String!) {
  editMessage(messageId: $messageId, newText: $newText, userId: $userId) {
    id
    text
    userId
    timestamp
  }
}
"#;

pub const EDIT_TEXT_MESSAGE_MUTATION: &str = r#"
mutation EditTextMessage($text: String!, $userId: String!) {
  editTextMessage(input: { to: $userId, text: $text }) {
    success
    message
  }
}
"#;

pub const SEND_TEXT_MESSAGE_MUTATION: &str = r#"
mutation SaveMessage($text: String!, $userId: String!) {
  sendTextMessage(input: { to: $userId, text: $text }) {
    success
    message
  }
}
"#;

pub const ADD_MESSAGE_MUTATION: &str = r#"
mutation AddMessage($text: String!, $userId: String!) {
  addMessage(text: $text, userId: $userId) {
    success
    message
  }
}
"#;

/// A stored message as returned by `messages` and `editMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Backend-defined; string or epoch number depending on the deployment.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

/// `{success, message}` result of the send/edit-text/add mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

pub fn latest_message(user_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(LATEST_MESSAGE_QUERY).variable("userId", user_id)
}

pub fn edit_message(message_id: &str, new_text: &str, user_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(EDIT_MESSAGE_MUTATION)
        .variable("messageId", message_id)
        .variable("newText", new_text)
        .variable("userId", user_id)
}

pub fn edit_text_message(text: &str, user_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(EDIT_TEXT_MESSAGE_MUTATION)
        .variable("text", text)
        .variable("userId", user_id)
}

pub fn send_text_message(text: &str, user_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(SEND_TEXT_MESSAGE_MUTATION)
        .variable("text", text)
        .variable("userId", user_id)
}

pub fn add_message(text: &str, user_id: &str) -> GraphQlRequest {
    GraphQlRequest::new(ADD_MESSAGE_MUTATION)
        .variable("text", text)
        .variable("userId", user_id)
}
