//! 启动流程：根据启动参数与登录状态决定显示哪个视图。
//!
//! Page bootstrap: decides which view the editor opens with.

use super::launch::LaunchParams;
use crate::client::{EditorClient, SaveTarget};
use crate::{Error, Result};
use tracing::{debug, error, info, warn};

pub const PROFILE_MISSING_MESSAGE: &str = "Failed to get user profile. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    List,
    Editor {
        text: String,
        target: SaveTarget,
    },
    /// OCR correction editor; `recipient` is the `userId` launch parameter, shown only.
    OcrEditor {
        text: String,
        recipient: Option<String>,
    },
    /// A login redirect was started; nothing else to show.
    Redirecting,
    Error {
        message: String,
        login_required: bool,
    },
}

impl View {
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let login_required = message.contains("login") || message.contains("Login");
        View::Error {
            message,
            login_required,
        }
    }

    pub fn save_target(&self) -> Option<SaveTarget> {
        match self {
            View::Editor { target, .. } => Some(target.clone()),
            View::OcrEditor { .. } => Some(SaveTarget::SendText),
            _ => None,
        }
    }

    /// Text the editor starts with.
    pub fn initial_text(&self) -> Option<&str> {
        match self {
            View::Editor { text, .. } | View::OcrEditor { text, .. } => Some(text),
            _ => None,
        }
    }
}

pub async fn bootstrap(client: &EditorClient, launch: &LaunchParams) -> View {
    if launch.is_list() {
        return View::List;
    }

    let target = SaveTarget::for_message_id(launch.message_id.as_deref());

    if let Some(message) = &launch.message {
        debug!("editor prefilled from launch parameters");
        return View::Editor {
            text: message.clone(),
            target,
        };
    }

    if !client.session().has_provider() {
        warn!("identity provider not loaded, opening empty editor");
        return View::Editor {
            text: String::new(),
            target,
        };
    }

    match signed_in_view(client, launch, target).await {
        Ok(view) => view,
        Err(e) => {
            error!(error = %e, "bootstrap failed");
            View::error(e.user_message())
        }
    }
}

async fn signed_in_view(
    client: &EditorClient,
    launch: &LaunchParams,
    target: SaveTarget,
) -> Result<View> {
    let session = client.session();
    session.ensure_initialized().await?;
    let provider = session.provider()?;

    let logged_in = provider.is_logged_in()?;
    info!(
        in_client = provider.is_in_client(),
        logged_in, "identity provider ready"
    );

    if !logged_in {
        info!("not logged in, redirecting to login");
        session.start_login().await?;
        return Ok(View::Redirecting);
    }

    let profile = provider.profile().await?;
    if profile.user_id.is_empty() {
        return Err(Error::generic(PROFILE_MISSING_MESSAGE));
    }
    session.set_current_user_id(Some(profile.user_id.clone()));
    debug!(user_id = profile.user_id.as_str(), "profile loaded");

    if let Some(text) = launch.ocr_text() {
        info!("opening OCR editor");
        return Ok(View::OcrEditor {
            text: text.to_string(),
            recipient: launch.user_id.clone(),
        });
    }

    let text = match client.fetch_latest_message(&profile.user_id).await {
        Ok(Some(message)) => message.text,
        Ok(None) => String::new(),
        Err(e) => {
            debug!(error = %e, "no previous message found");
            String::new()
        }
    };
    Ok(View::Editor { text, target })
}
