//! Configuration management
//!
//! Settings live in `settings.json` inside the comptes directory:
//! ```json
//! {
//!   "endpoint": { "url": "http://localhost:8080/BanqueService", "namespace": "http://ws/" }
//! }
//! ```
//! Keys the client does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::Error;

/// Default service endpoint
pub const DEFAULT_URL: &str = "http://localhost:8080/BanqueService";

/// Default service namespace
pub const DEFAULT_NAMESPACE: &str = "http://ws/";

/// Environment variable overriding the endpoint URL
pub const URL_ENV: &str = "COMPTES_URL";

/// Environment variable overriding the service namespace
pub const NAMESPACE_ENV: &str = "COMPTES_NAMESPACE";

/// Environment variable overriding the settings directory
pub const DIR_ENV: &str = "COMPTES_DIR";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    endpoint: EndpointSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Remote service address: one URL, one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub namespace: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Endpoint {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: namespace.into(),
        }
    }

    /// Check the URL is an absolute http(s) URL and the namespace is set
    pub fn validate(&self) -> std::result::Result<(), Error> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| Error::config(format!("invalid endpoint URL '{}': {}", self.url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "endpoint URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::config("service namespace cannot be empty"));
        }
        Ok(())
    }
}

/// Client configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub endpoint: Endpoint,
}

impl Config {
    /// Load config from the comptes directory
    ///
    /// Precedence: environment variables, then settings.json, then defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::from_file(dir)?;

        if let Some(url) = env_override(URL_ENV) {
            config.endpoint.url = url;
        }
        if let Some(namespace) = env_override(NAMESPACE_ENV) {
            config.endpoint.namespace = namespace;
        }

        config.endpoint.validate()?;
        Ok(config)
    }

    /// Load settings.json (or defaults) without env overrides or validation
    ///
    /// Used when editing the file, so a bad stored URL can still be replaced.
    pub fn from_file(dir: &Path) -> Result<Self> {
        let settings_path = dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", settings_path))?
        } else {
            SettingsFile::default()
        };

        let endpoint = Endpoint::new(
            raw.endpoint.url.clone().unwrap_or_else(|| DEFAULT_URL.to_string()),
            raw.endpoint
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        );

        Ok(Self { endpoint })
    }

    /// Save config to the comptes directory
    /// Preserves other settings that the client doesn't manage
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.endpoint.validate()?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;
        let settings_path = dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.endpoint.url = Some(self.endpoint.url.clone());
        settings.endpoint.namespace = Some(self.endpoint.namespace.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.endpoint.url = url.into();
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.endpoint.namespace = namespace.into();
    }
}

/// Settings directory: `COMPTES_DIR`, else `~/.comptes`
pub fn default_dir() -> Result<PathBuf> {
    if let Some(dir) = env_override(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".comptes"))
        .context("Could not find home directory")
}

fn env_override(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
