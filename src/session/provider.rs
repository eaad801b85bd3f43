//! 外部协作者：身份 SDK 与宿主页面。
//!
//! External collaborators: the identity SDK and the hosting page.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Profile of the signed-in visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// The messaging platform's identity SDK.
///
/// Calls may fail the way SDK calls throw; the session guard catches and logs every
/// failure instead of propagating it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One-time initialization with the application identifier.
    async fn init(&self, app_id: &str) -> Result<()>;

    fn is_logged_in(&self) -> Result<bool>;

    /// Whether the page runs inside the platform's in-app browser.
    fn is_in_client(&self) -> bool;

    /// Start a login flow. Inside the host client this redirects back to `redirect_uri`.
    async fn login(&self, redirect_uri: Option<&str>) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>>;

    async fn profile(&self) -> Result<Profile>;

    async fn close_window(&self) -> Result<()>;
}

/// The page hosting the editor.
#[async_trait]
pub trait HostPage: Send + Sync {
    fn current_url(&self) -> Option<String>;

    /// Full reload; the last-resort recovery for a broken session.
    async fn reload(&self);

    async fn close(&self);
}
