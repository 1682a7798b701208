//! Analyzer configuration.
//!
//! Credentials and endpoints are explicit values handed to the analyzer at
//! construction. `from_env()` is a convenience for the binary; library
//! callers can build the struct directly.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Defaults
// ═══════════════════════════════════════════════════════════

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_HOST_URL: &str = "https://api.imgbb.com/1/upload";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_IMAGE_HOST_KEY: &str = "IMGBB_API_KEY";
pub const ENV_API_URL: &str = "CYLSCAN_API_URL";
pub const ENV_MODEL: &str = "CYLSCAN_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "CYLSCAN_TIMEOUT_SECS";
pub const ENV_FOCUSED_REQUERY: &str = "CYLSCAN_FOCUSED_REQUERY";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Everything the network layer around the core needs.
///
/// Serializes without the credentials.
#[derive(Clone, Serialize)]
pub struct AnalyzerConfig {
    /// Base URL of the chat-completions API.
    pub api_url: String,
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    /// imgbb-compatible upload endpoint.
    pub image_host_url: String,
    #[serde(skip)]
    pub image_host_key: String,
    /// Per-request timeout for both services.
    pub timeout_secs: u64,
    /// Issue one narrow re-query per unresolved critical parameter.
    pub focused_requery: bool,
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("image_host_url", &self.image_host_url)
            .field("image_host_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("focused_requery", &self.focused_requery)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Defaults for everything but the two credentials.
    pub fn new(api_key: &str, image_host_key: &str) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            image_host_url: DEFAULT_IMAGE_HOST_URL.to_string(),
            image_host_key: image_host_key.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            focused_requery: true,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::MissingCredential(ENV_API_KEY))?;
        let image_host_key =
            get(ENV_IMAGE_HOST_KEY).ok_or(ConfigError::MissingCredential(ENV_IMAGE_HOST_KEY))?;

        let mut config = Self::new(&api_key, &image_host_key);
        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = get(ENV_FOCUSED_REQUERY) {
            config.focused_requery = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                var: ENV_FOCUSED_REQUERY,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_focused_requery(mut self, enabled: bool) -> Self {
        self.focused_requery = enabled;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_with_credentials() {
        let config =
            AnalyzerConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-1"), (ENV_IMAGE_HOST_KEY, "ib-1")]))
                .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.image_host_url, DEFAULT_IMAGE_HOST_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.focused_requery);
    }

    #[test]
    fn missing_api_key() {
        let err = AnalyzerConfig::from_lookup(lookup(&[(ENV_IMAGE_HOST_KEY, "ib-1")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential(ENV_API_KEY));
    }

    #[test]
    fn blank_image_host_key_counts_as_missing() {
        let err =
            AnalyzerConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-1"), (ENV_IMAGE_HOST_KEY, "  ")]))
                .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential(ENV_IMAGE_HOST_KEY));
    }

    #[test]
    fn overrides_from_environment() {
        let config = AnalyzerConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-1"),
            (ENV_IMAGE_HOST_KEY, "ib-1"),
            (ENV_API_URL, "http://localhost:8080/v1"),
            (ENV_MODEL, "local-vlm"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_FOCUSED_REQUERY, "off"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "local-vlm");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.focused_requery);
    }

    #[test]
    fn invalid_timeout_rejected() {
        for bad in ["soon", "0", "-5"] {
            let err = AnalyzerConfig::from_lookup(lookup(&[
                (ENV_API_KEY, "sk-1"),
                (ENV_IMAGE_HOST_KEY, "ib-1"),
                (ENV_TIMEOUT_SECS, bad),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { var: ENV_TIMEOUT_SECS, .. }));
        }
    }

    #[test]
    fn invalid_flag_rejected() {
        let err = AnalyzerConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-1"),
            (ENV_IMAGE_HOST_KEY, "ib-1"),
            (ENV_FOCUSED_REQUERY, "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_FOCUSED_REQUERY, .. }));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = AnalyzerConfig::new("sk-secret", "ib-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("ib-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn serialization_skips_credentials() {
        let config = AnalyzerConfig::new("sk-secret", "ib-secret").with_model("m");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"model\":\"m\""));
        assert!(json.contains("\"focused_requery\":true"));
    }

    #[test]
    fn builder_setters() {
        let config = AnalyzerConfig::new("a", "b")
            .with_api_url("http://x")
            .with_timeout_secs(5)
            .with_focused_requery(false);
        assert_eq!(config.api_url, "http://x");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.focused_requery);
    }
}
