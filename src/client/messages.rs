//! 消息操作：最新消息查询、编辑、发送以及统一的保存流程。
//!
//! Message operations and the unified save flow.

use super::classify::mentions_auth;
use super::core::EditorClient;
use crate::graphql::operations;
use crate::graphql::{Message, MutationAck};
use crate::session::UserIdResolution;
use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a message";
pub const EDIT_FAILED_MESSAGE: &str = "Failed to edit message";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save message";

/// What a save does with the edited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Edit a stored message in place (`editMessage`).
    EditExisting { message_id: String },
    /// Send the text as a new message under an edit header (`editTextMessage`).
    EditText,
    /// Send OCR-corrected text (`sendTextMessage`), then persist it best-effort (`addMessage`).
    SendText,
}

impl SaveTarget {
    /// `messageId` launch parameter present → edit in place, otherwise edit-text.
    pub fn for_message_id(message_id: Option<&str>) -> Self {
        match message_id.filter(|id| !id.is_empty()) {
            Some(id) => SaveTarget::EditExisting {
                message_id: id.to_string(),
            },
            None => SaveTarget::EditText,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, SaveTarget::SendText)
    }

    pub fn user_id_resolution(&self) -> UserIdResolution {
        match self {
            SaveTarget::SendText => UserIdResolution::ProfileLookup,
            _ => UserIdResolution::Cached,
        }
    }

    pub fn is_ocr(&self) -> bool {
        matches!(self, SaveTarget::SendText)
    }

    fn name(&self) -> &'static str {
        match self {
            SaveTarget::EditExisting { .. } => "edit_message",
            SaveTarget::EditText => "edit_text_message",
            SaveTarget::SendText => "send_text_message",
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub user_id: String,
    /// The edited message, for in-place edits.
    pub message: Option<Message>,
    pub ack: Option<MutationAck>,
}

/// Reject input that is empty after trimming; returns the trimmed text.
pub fn validate_input(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_with_context(
            EMPTY_INPUT_MESSAGE,
            ErrorContext::new()
                .with_field_path("message.text")
                .with_source("save_validator"),
        ));
    }
    Ok(trimmed)
}

fn field<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    data.get(name).filter(|v| !v.is_null())
}

fn expect_ack(data: &Value, name: &str) -> Result<MutationAck> {
    let ack: MutationAck = match field(data, name) {
        Some(v) => serde_json::from_value(v.clone())?,
        None => return Err(Error::generic(SAVE_FAILED_MESSAGE)),
    };
    if !ack.success {
        let message = ack
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| SAVE_FAILED_MESSAGE.to_string());
        // Rejections worded like a credential problem take the re-login path.
        if mentions_auth(&message) {
            return Err(Error::auth_expired());
        }
        return Err(Error::generic(message));
    }
    Ok(ack)
}

impl EditorClient {
    /// Latest message of `user_id`, or `None` when there is none.
    ///
    /// Only one fetch runs at a time; a call made while another is in flight returns
    /// `Ok(None)` immediately without touching the network.
    pub async fn fetch_latest_message(&self, user_id: &str) -> Result<Option<Message>> {
        let Ok(_permit) = self.fetch_gate.try_acquire() else {
            debug!("latest-message fetch already in flight");
            return Ok(None);
        };

        let data = self
            .graphql_request(&operations::latest_message(user_id))
            .await?;
        let messages: Vec<Message> = match field(&data, "messages") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(),
        };
        Ok(messages.into_iter().next())
    }

    /// `editMessage`; a null result means the edit failed.
    pub async fn edit_message(
        &self,
        message_id: &str,
        new_text: &str,
        user_id: &str,
    ) -> Result<Message> {
        let data = self
            .graphql_request(&operations::edit_message(message_id, new_text, user_id))
            .await?;
        match field(&data, "editMessage") {
            Some(v) => Ok(serde_json::from_value(v.clone())?),
            None => Err(Error::generic(EDIT_FAILED_MESSAGE)),
        }
    }

    pub async fn edit_text_message(&self, text: &str, user_id: &str) -> Result<MutationAck> {
        let data = self
            .graphql_request(&operations::edit_text_message(text, user_id))
            .await?;
        expect_ack(&data, "editTextMessage")
    }

    pub async fn send_text_message(&self, text: &str, user_id: &str) -> Result<MutationAck> {
        let data = self
            .graphql_request(&operations::send_text_message(text, user_id))
            .await?;
        expect_ack(&data, "sendTextMessage")
    }

    /// `addMessage`. The ack is returned as-is; callers treat persistence as best-effort.
    pub async fn add_message(&self, text: &str, user_id: &str) -> Result<Option<MutationAck>> {
        let data = self
            .graphql_request(&operations::add_message(text, user_id))
            .await?;
        match field(&data, "addMessage") {
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
            None => Ok(None),
        }
    }

    /// The one save operation behind every editor.
    ///
    /// Validates input before any network call, runs the session guard for the edit
    /// targets, resolves the acting user id per target, then sends exactly one mutation
    /// (plus the best-effort persistence call for [`SaveTarget::SendText`]).
    pub async fn save(&self, target: &SaveTarget, text: &str) -> Result<SaveReceipt> {
        let text = validate_input(text)?;

        if target.requires_session() && !self.session.ensure_session().await {
            return Err(Error::session_expired());
        }

        let user_id = self
            .session
            .resolve_user_id(target.user_id_resolution())
            .await?;

        let receipt = match target {
            SaveTarget::EditExisting { message_id } => {
                let message = self.edit_message(message_id, text, &user_id).await?;
                SaveReceipt {
                    user_id,
                    message: Some(message),
                    ack: None,
                }
            }
            SaveTarget::EditText => {
                let ack = self.edit_text_message(text, &user_id).await?;
                SaveReceipt {
                    user_id,
                    message: None,
                    ack: Some(ack),
                }
            }
            SaveTarget::SendText => {
                let ack = self.send_text_message(text, &user_id).await?;
                if let Err(e) = self.add_message(text, &user_id).await {
                    warn!(error = %e, "failed to store message in backend");
                }
                SaveReceipt {
                    user_id,
                    message: None,
                    ack: Some(ack),
                }
            }
        };

        info!(save_target = target.name(), "message saved");
        Ok(receipt)
    }
}
