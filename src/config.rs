//! Runtime configuration.
//!
//! A `Config` is built once at process start (JSON file, then environment
//! overlay) and passed by reference into the resolver and model client. Core
//! code never reads the environment itself.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SECONDARY_SOURCE_URL: &str = "https://api.scripture.api.bible/v1";

pub const MOONSHOT_ENDPOINT: &str = "https://api.moonshot.cn/v1/chat/completions";
pub const MOONSHOT_MODEL: &str = "moonshot-v1-128k";
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENROUTER_MODEL: &str = "moonshotai/kimi-k2";
const OPENROUTER_KEY_PREFIX: &str = "sk-or-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model_api_key: Option<String>,
    /// Overrides the endpoint chosen from the key prefix.
    pub model_endpoint: Option<String>,
    /// Overrides the model chosen from the key prefix.
    pub model_name: Option<String>,
    pub temperature: f32,
    pub model_timeout_secs: u64,
    pub source_timeout_secs: u64,
    /// Base URL of the primary verse API. The primary tier is skipped
    /// while this is unset.
    pub primary_source_url: Option<String>,
    pub secondary_source_key: Option<String>,
    pub secondary_source_id: Option<String>,
    pub secondary_source_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_api_key: None,
            model_endpoint: None,
            model_name: None,
            temperature: 0.3,
            model_timeout_secs: 60,
            source_timeout_secs: 10,
            primary_source_url: None,
            secondary_source_key: None,
            secondary_source_id: None,
            secondary_source_url: DEFAULT_SECONDARY_SOURCE_URL.to_string(),
        }
    }
}

/// Chat-completions target selected for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRoute {
    pub endpoint: String,
    pub model: String,
}

impl Config {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Config> {
        let content =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Overlay values from `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("VLEX_MODEL_API_KEY").or_else(|| get("KIMI_API_KEY")) {
            self.model_api_key = Some(key);
        }
        if let Some(endpoint) = get("VLEX_MODEL_ENDPOINT") {
            self.model_endpoint = Some(endpoint);
        }
        if let Some(model) = get("VLEX_MODEL_NAME") {
            self.model_name = Some(model);
        }
        if let Some(url) = get("VLEX_PRIMARY_SOURCE_URL") {
            self.primary_source_url = Some(url);
        }
        if let Some(key) = get("VLEX_SECONDARY_SOURCE_KEY") {
            self.secondary_source_key = Some(key);
        }
        if let Some(id) = get("VLEX_SECONDARY_SOURCE_ID") {
            self.secondary_source_id = Some(id);
        }
        if let Some(url) = get("VLEX_SECONDARY_SOURCE_URL") {
            self.secondary_source_url = url;
        }
        if let Some(secs) = get("VLEX_MODEL_TIMEOUT_SECS") {
            self.model_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("parse VLEX_MODEL_TIMEOUT_SECS={secs}"))?;
        }
        if let Some(secs) = get("VLEX_SOURCE_TIMEOUT_SECS") {
            self.source_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("parse VLEX_SOURCE_TIMEOUT_SECS={secs}"))?;
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// The primary base URL, or `None` if unset or blank.
    pub fn primary_source_url(&self) -> Option<&str> {
        self.primary_source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Both secondary credentials, or `None` if either is missing or blank.
    pub fn secondary_credentials(&self) -> Option<(&str, &str)> {
        let key = self.secondary_source_key.as_deref().map(str::trim)?;
        let id = self.secondary_source_id.as_deref().map(str::trim)?;
        if key.is_empty() || id.is_empty() {
            return None;
        }
        Some((key, id))
    }

    /// Pick the model endpoint and name by key prefix; explicit overrides win.
    pub fn model_route(&self) -> ModelRoute {
        let key = self.model_api_key.as_deref().unwrap_or_default();
        let (endpoint, model) = if key.starts_with(OPENROUTER_KEY_PREFIX) {
            (OPENROUTER_ENDPOINT, OPENROUTER_MODEL)
        } else {
            (MOONSHOT_ENDPOINT, MOONSHOT_MODEL)
        };
        ModelRoute {
            endpoint: self
                .model_endpoint
                .clone()
                .unwrap_or_else(|| endpoint.to_string()),
            model: self.model_name.clone().unwrap_or_else(|| model.to_string()),
        }
    }
}
