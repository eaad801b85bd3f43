//! In-memory identity provider and host page for tests and scripted runs.

use super::provider::{HostPage, IdentityProvider, Profile};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// A call observed by [`InMemoryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Init(String),
    Login(Option<String>),
    Logout,
    Profile,
    CloseWindow,
}

#[derive(Debug, Default)]
struct ProviderState {
    logged_in: bool,
    in_client: bool,
    token: Option<String>,
    profile: Option<Profile>,
    fail_init: bool,
    fail_token: bool,
    calls: Vec<ProviderCall>,
}

/// Scripted provider that records every call.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    state: Mutex<ProviderState>,
}

impl InMemoryProvider {
    /// Logged in with `token`; `profile()` yields `user_id`.
    pub fn logged_in(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let provider = Self::default();
        {
            let mut st = provider.lock();
            st.logged_in = true;
            st.token = Some(token.into());
            st.profile = Some(Profile {
                user_id: user_id.into(),
                display_name: None,
            });
        }
        provider
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn in_client(self, in_client: bool) -> Self {
        self.lock().in_client = in_client;
        self
    }

    pub fn without_token(self) -> Self {
        self.lock().token = None;
        self
    }

    pub fn without_profile(self) -> Self {
        self.lock().profile = None;
        self
    }

    pub fn failing_init(self) -> Self {
        self.lock().fail_init = true;
        self
    }

    pub fn failing_token(self) -> Self {
        self.lock().fail_token = true;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: &ProviderCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn login_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ProviderCall::Login(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryProvider {
    async fn init(&self, app_id: &str) -> Result<()> {
        let mut st = self.lock();
        st.calls.push(ProviderCall::Init(app_id.to_string()));
        if st.fail_init {
            return Err(Error::provider("init failed"));
        }
        Ok(())
    }

    fn is_logged_in(&self) -> Result<bool> {
        Ok(self.lock().logged_in)
    }

    fn is_in_client(&self) -> bool {
        self.lock().in_client
    }

    async fn login(&self, redirect_uri: Option<&str>) -> Result<()> {
        self.lock()
            .calls
            .push(ProviderCall::Login(redirect_uri.map(str::to_string)));
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let mut st = self.lock();
        st.calls.push(ProviderCall::Logout);
        st.logged_in = false;
        Ok(())
    }

    fn access_token(&self) -> Result<Option<String>> {
        let st = self.lock();
        if st.fail_token {
            return Err(Error::provider("access token unavailable"));
        }
        Ok(st.token.clone())
    }

    async fn profile(&self) -> Result<Profile> {
        let mut st = self.lock();
        st.calls.push(ProviderCall::Profile);
        st.profile
            .clone()
            .ok_or_else(|| Error::provider("profile unavailable"))
    }

    async fn close_window(&self) -> Result<()> {
        self.lock().calls.push(ProviderCall::CloseWindow);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct HostState {
    reloads: usize,
    closes: usize,
}

/// Host page that only counts reloads and closes.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    url: Option<String>,
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            state: Mutex::default(),
        }
    }

    pub fn reloads(&self) -> usize {
        self.lock().reloads
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HostPage for InMemoryHost {
    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    async fn reload(&self) {
        self.lock().reloads += 1;
    }

    async fn close(&self) {
        self.lock().closes += 1;
    }
}
