use crate::{Error, ErrorContext, Result};
use url::Url;

pub const LIST_PATH: &str = "/list";

/// Query parameters the editor is launched with.
///
/// Values are percent-decoded exactly once; a missing parameter and an empty one are
/// both `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
    pub url: String,
    pub path: String,
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub message_id: Option<String>,
    pub action: Option<String>,
    pub text: Option<String>,
}

impl LaunchParams {
    pub fn parse(launch_url: &str) -> Result<Self> {
        let url = Url::parse(launch_url).map_err(|e| {
            Error::validation_with_context(
                format!("invalid launch url: {e}"),
                ErrorContext::new()
                    .with_field_path("launch.url")
                    .with_details(launch_url.to_string()),
            )
        })?;

        let mut params = LaunchParams {
            url: url.to_string(),
            path: url.path().to_string(),
            ..Default::default()
        };
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "message" => params.message = value,
                "userId" => params.user_id = value,
                "messageId" => params.message_id = value,
                "action" => params.action = value,
                "text" => params.text = value,
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn is_list(&self) -> bool {
        self.path == LIST_PATH
    }

    /// `action=edit` with non-empty `text`.
    pub fn ocr_text(&self) -> Option<&str> {
        match (self.action.as_deref(), self.text.as_deref()) {
            (Some("edit"), Some(text)) => Some(text),
            _ => None,
        }
    }
}
