//! cms-hydrate configuration file handling

use crate::Result;
use gql_client::FetchPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the GraphQL endpoint URL
pub const ENDPOINT_ENV_VAR: &str = "STRAPI_URL";

/// cms-hydrate configuration
///
/// Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrateConfig {
    /// GraphQL endpoint URL; left unset, requests fail when issued
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Fetch policy used by the CLI when none is requested
    #[serde(default)]
    pub default_fetch_policy: FetchPolicy,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl HydrateConfig {
    /// Create a configuration with defaults and no endpoint
    pub fn new() -> Self {
        Self {
            endpoint: None,
            request_timeout_secs: default_request_timeout_secs(),
            default_fetch_policy: FetchPolicy::default(),
        }
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::HydrateError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading cms-hydrate configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            endpoint = config.endpoint.as_deref().unwrap_or("<unset>"),
            timeout_secs = config.request_timeout_secs,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::new())
        }
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving cms-hydrate configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/cms-hydrate/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("cms-hydrate");
        path.push("config.yaml");
        path
    }

    /// Apply `STRAPI_URL` from the environment, if set
    pub fn with_env_overrides(self) -> Self {
        self.with_endpoint_override(std::env::var(ENDPOINT_ENV_VAR).ok())
    }

    /// Replace the endpoint when `endpoint` is a non-blank value
    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self::new()
    }
}
