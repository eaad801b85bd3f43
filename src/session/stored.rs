use super::provider::{IdentityProvider, Profile};
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use keyring::Entry;
use std::env;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keyring service under which access tokens are stored.
pub const KEYRING_SERVICE: &str = "liff-editor";

pub const ENV_ACCESS_TOKEN: &str = "LIFF_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "LIFF_USER_ID";
pub const ENV_DISPLAY_NAME: &str = "LIFF_DISPLAY_NAME";

/// Headless provider for running outside the in-app browser.
///
/// `init` loads the access token for the application id, first from the OS keyring
/// (service [`KEYRING_SERVICE`], account = app id) and then from `LIFF_ACCESS_TOKEN`.
/// Login cannot redirect here, so it only tells the operator where to put a token.
pub struct StoredCredentialProvider {
    token: ArcSwapOption<String>,
    user_id: Option<String>,
    display_name: Option<String>,
}

impl StoredCredentialProvider {
    pub fn new() -> Self {
        Self {
            token: ArcSwapOption::empty(),
            user_id: env::var(ENV_USER_ID).ok().filter(|s| !s.is_empty()),
            display_name: env::var(ENV_DISPLAY_NAME).ok(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn load_token(app_id: &str) -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, app_id) {
            if let Ok(token) = entry.get_password() {
                return Some(token);
            }
        }

        // 2. Try Environment Variable
        env::var(ENV_ACCESS_TOKEN).ok().filter(|s| !s.is_empty())
    }
}

impl Default for StoredCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StoredCredentialProvider {
    async fn init(&self, app_id: &str) -> Result<()> {
        let token = Self::load_token(app_id);
        debug!(app_id, found = token.is_some(), "stored credential lookup");
        self.token.store(token.map(Arc::new));
        Ok(())
    }

    fn is_logged_in(&self) -> Result<bool> {
        Ok(self.token.load().is_some())
    }

    fn is_in_client(&self) -> bool {
        false
    }

    async fn login(&self, redirect_uri: Option<&str>) -> Result<()> {
        warn!(
            redirect_uri = redirect_uri.unwrap_or(""),
            "sign-in required: store an access token in the OS keyring (service {}) or set {}",
            KEYRING_SERVICE,
            ENV_ACCESS_TOKEN
        );
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.token.store(None);
        info!("stored credential dropped for this run");
        Ok(())
    }

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.load_full().map(|t| t.as_ref().clone()))
    }

    async fn profile(&self) -> Result<Profile> {
        let user_id = self
            .user_id
            .clone()
            .ok_or_else(|| Error::provider(format!("profile unavailable: {} is not set", ENV_USER_ID)))?;
        Ok(Profile {
            user_id,
            display_name: self.display_name.clone(),
        })
    }

    async fn close_window(&self) -> Result<()> {
        info!("editor window closed");
        Ok(())
    }
}
