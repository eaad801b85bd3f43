//! 会话守卫：在任何变更请求前确认身份令牌有效，必要时触发重新登录。
//!
//! Session guard.
//!
//! [`SessionContext`] owns everything the page used to keep in globals: the provider
//! handle, the one-time init flag and the cached user id. It is shared (`Arc`) between
//! bootstrap, the client and the recovery driver.

use super::provider::{HostPage, IdentityProvider};
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How a save resolves the acting user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIdResolution {
    /// Use the id cached at bootstrap; fail when absent.
    Cached,
    /// Fall back to a profile lookup (and cache the result) when nothing is cached.
    ProfileLookup,
}

pub struct SessionContext {
    provider: Option<Arc<dyn IdentityProvider>>,
    host: Arc<dyn HostPage>,
    app_id: String,
    initialized: AtomicBool,
    init_lock: tokio::sync::Mutex<()>,
    current_user_id: ArcSwapOption<String>,
}

impl SessionContext {
    /// `provider = None` models an SDK that failed to load.
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        host: Arc<dyn HostPage>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            host,
            app_id: app_id.into(),
            initialized: AtomicBool::new(false),
            init_lock: tokio::sync::Mutex::new(()),
            current_user_id: ArcSwapOption::empty(),
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn IdentityProvider>> {
        self.provider.as_ref().ok_or(Error::ProviderUnavailable)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn host(&self) -> &Arc<dyn HostPage> {
        &self.host
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_in_client(&self) -> bool {
        self.provider
            .as_ref()
            .map(|p| p.is_in_client())
            .unwrap_or(false)
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.current_user_id.load_full().map(|id| id.as_ref().clone())
    }

    pub fn set_current_user_id(&self, user_id: Option<String>) {
        self.current_user_id
            .store(user_id.filter(|id| !id.is_empty()).map(Arc::new));
    }

    /// Initialize the provider once per process; concurrent callers wait for the first.
    pub async fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        let provider = self.provider()?;
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return Ok(());
        }
        provider.init(&self.app_id).await?;
        self.initialized.store(true, Ordering::Release);
        debug!(app_id = self.app_id.as_str(), "identity provider initialized");
        Ok(())
    }

    /// Start the provider's login flow, redirecting back to this page inside the host client.
    pub async fn start_login(&self) -> Result<()> {
        let provider = self.provider()?;
        if provider.is_in_client() {
            let redirect = self.host.current_url();
            provider.login(redirect.as_deref()).await
        } else {
            provider.login(None).await
        }
    }

    /// Whether a valid session exists right now.
    ///
    /// `false` means "abort the current action": either authentication is impossible or a
    /// login redirect has just been started. Provider failures are logged, never raised.
    pub async fn ensure_session(&self) -> bool {
        if !self.has_provider() {
            warn!("identity provider not loaded");
            return false;
        }
        match self.check_session().await {
            Ok(valid) => valid,
            Err(e) => {
                error!(error = %e, "session check failed");
                false
            }
        }
    }

    async fn check_session(&self) -> Result<bool> {
        self.ensure_initialized().await?;
        let provider = self.provider()?;

        if !provider.is_logged_in()? {
            warn!("not logged in, starting login flow");
            self.start_login().await?;
            return Ok(false);
        }

        if provider.access_token()?.is_none() {
            warn!("no valid access token");
            return Ok(false);
        }

        debug!("session is valid");
        Ok(true)
    }

    /// Force a fresh login (logout then login), reloading the page as a last resort.
    pub async fn refresh_session(&self) {
        let Some(provider) = self.provider.as_ref() else {
            info!("identity provider not loaded, reloading page");
            self.host.reload().await;
            return;
        };

        let relogin = async {
            if provider.is_logged_in()? {
                provider.logout().await?;
            }
            provider.login(None).await
        };
        if let Err(e) = relogin.await {
            error!(error = %e, "failed to refresh session, reloading page");
            self.host.reload().await;
        }
    }

    /// Bearer token for outgoing requests, if the visitor is logged in.
    ///
    /// Never starts a login; provider failures yield `None`.
    pub fn current_token(&self) -> Option<String> {
        let provider = self.provider.as_ref()?;
        let token = provider.is_logged_in().and_then(|logged_in| {
            if logged_in {
                provider.access_token()
            } else {
                Ok(None)
            }
        });
        match token {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "failed to read access token");
                None
            }
        }
    }

    pub async fn resolve_user_id(&self, resolution: UserIdResolution) -> Result<String> {
        if let Some(id) = self.current_user_id() {
            return Ok(id);
        }
        if resolution == UserIdResolution::ProfileLookup {
            match self.lookup_profile_user_id().await {
                Ok(Some(id)) => {
                    debug!(user_id = id.as_str(), "user id resolved from profile");
                    self.set_current_user_id(Some(id.clone()));
                    return Ok(id);
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "failed to get profile"),
            }
        }
        Err(Error::login_required())
    }

    async fn lookup_profile_user_id(&self) -> Result<Option<String>> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(None);
        };
        if !provider.is_logged_in()? {
            return Ok(None);
        }
        let profile = provider.profile().await?;
        Ok(Some(profile.user_id).filter(|id| !id.is_empty()))
    }

    /// Close the hosting window through the provider, or the page itself without one.
    pub async fn close_window(&self) {
        match self.provider.as_ref() {
            Some(provider) => {
                if let Err(e) = provider.close_window().await {
                    warn!(error = %e, "provider could not close the window");
                    self.host.close().await;
                }
            }
            None => self.host.close().await,
        }
    }
}
