//! 运行配置：GraphQL 端点、请求超时、LIFF 应用 ID 与界面延时。
//!
//! Runtime configuration.
//!
//! Sources are layered, later ones overriding earlier ones:
//! defaults → optional YAML file → environment variables → explicit builder/CLI overrides.

use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3000;

pub const ENV_GRAPHQL_URL: &str = "LIFF_EDITOR_GRAPHQL_URL";
pub const ENV_FETCH_TIMEOUT_MS: &str = "LIFF_EDITOR_FETCH_TIMEOUT_MS";
pub const ENV_LIFF_ID: &str = "LIFF_EDITOR_LIFF_ID";

/// Fixed delays of the save affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiDelays {
    /// How long the success label stays before the window closes or the form resets.
    pub success: Duration,
    /// Pause between "session expired" and the re-login confirmation.
    pub reauth_prompt: Duration,
    /// Display time of the failure label on the edit flows.
    pub failure_reset: Duration,
    /// Display time of the success/failure label on the OCR flow.
    pub ocr_reset: Duration,
}

impl Default for UiDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(1000),
            reauth_prompt: Duration::from_millis(1000),
            failure_reset: Duration::from_millis(3000),
            ocr_reset: Duration::from_millis(2000),
        }
    }
}

impl UiDelays {
    /// All delays zero. Useful for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            success: Duration::ZERO,
            reauth_prompt: Duration::ZERO,
            failure_reset: Duration::ZERO,
            ocr_reset: Duration::ZERO,
        }
    }
}

/// Validated editor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub graphql_url: String,
    pub fetch_timeout: Duration,
    pub liff_id: String,
    pub delays: UiDelays,
}

impl EditorConfig {
    pub fn new(graphql_url: impl Into<String>, liff_id: impl Into<String>) -> Self {
        Self {
            graphql_url: graphql_url.into(),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            liff_id: liff_id.into(),
            delays: UiDelays::default(),
        }
    }

    /// A zero timeout falls back to the default.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = effective_timeout(timeout);
        self
    }

    pub fn with_delays(mut self, delays: UiDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Load from environment variables only.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load from an optional YAML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut layer = match path {
            Some(path) => ConfigLayer::from_yaml_file(path)?,
            None => ConfigLayer::default(),
        };
        layer.apply_env(|key| std::env::var(key).ok());
        layer.build()
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.graphql_url).map_err(|e| {
            Error::configuration_with_context(
                "graphql_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("config.graphql_url")
                    .with_details(e.to_string())
                    .with_source("config_validator"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "graphql_url must use http or https",
                ErrorContext::new()
                    .with_field_path("config.graphql_url")
                    .with_details(parsed.scheme().to_string())
                    .with_source("config_validator"),
            ));
        }
        if self.liff_id.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "liff_id must not be empty",
                ErrorContext::new()
                    .with_field_path("config.liff_id")
                    .with_source("config_validator"),
            ));
        }
        Ok(())
    }
}

/// A missing, zero or unparsable timeout falls back to the default.
pub fn parse_timeout_ms(raw: Option<&str>) -> Duration {
    let ms = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Zero means "not configured" and falls back to the default.
pub fn effective_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)
    } else {
        timeout
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DelaysLayer {
    success_ms: Option<u64>,
    reauth_prompt_ms: Option<u64>,
    failure_reset_ms: Option<u64>,
    ocr_reset_ms: Option<u64>,
}

/// Partially specified configuration; one per source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub graphql_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timeout")]
    pub fetch_timeout_ms: Option<String>,
    pub liff_id: Option<String>,
    #[serde(default)]
    delays: DelaysLayer,
}

// Accepts `fetch_timeout_ms: 5000` as well as the string form used by environment variables.
fn deserialize_timeout<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Millis(ms) => ms.to_string(),
        Raw::Text(text) => text,
    }))
}

impl ConfigLayer {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|e| {
            Error::configuration_with_context(
                "failed to parse configuration file",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                "failed to read configuration file",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&source)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_GRAPHQL_URL) {
            self.graphql_url = Some(v);
        }
        if let Some(v) = lookup(ENV_FETCH_TIMEOUT_MS) {
            self.fetch_timeout_ms = Some(v);
        }
        if let Some(v) = lookup(ENV_LIFF_ID) {
            self.liff_id = Some(v);
        }
    }

    pub fn override_graphql_url(&mut self, url: Option<String>) {
        if url.is_some() {
            self.graphql_url = url;
        }
    }

    pub fn override_fetch_timeout_ms(&mut self, ms: Option<u64>) {
        if let Some(ms) = ms {
            self.fetch_timeout_ms = Some(ms.to_string());
        }
    }

    pub fn override_liff_id(&mut self, liff_id: Option<String>) {
        if liff_id.is_some() {
            self.liff_id = liff_id;
        }
    }

    pub fn build(self) -> Result<EditorConfig> {
        let graphql_url = self.graphql_url.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
            Error::configuration_with_context(
                "graphql_url is required",
                ErrorContext::new()
                    .with_field_path("config.graphql_url")
                    .with_details(format!("set {} or graphql_url in the config file", ENV_GRAPHQL_URL))
                    .with_source("config_loader"),
            )
        })?;
        let liff_id = self.liff_id.unwrap_or_default();

        let defaults = UiDelays::default();
        let ms_or = |v: Option<u64>, d: Duration| v.map(Duration::from_millis).unwrap_or(d);
        let delays = UiDelays {
            success: ms_or(self.delays.success_ms, defaults.success),
            reauth_prompt: ms_or(self.delays.reauth_prompt_ms, defaults.reauth_prompt),
            failure_reset: ms_or(self.delays.failure_reset_ms, defaults.failure_reset),
            ocr_reset: ms_or(self.delays.ocr_reset_ms, defaults.ocr_reset),
        };

        let config = EditorConfig {
            graphql_url,
            fetch_timeout: parse_timeout_ms(self.fetch_timeout_ms.as_deref()),
            liff_id,
            delays,
        };
        config.validate()?;
        Ok(config)
    }
}
