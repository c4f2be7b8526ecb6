//! Configuration Management
//!
//! Resolves the provider inputs (`url`, `apikey`) from an explicit value, the
//! environment, or the user config file, in that order.

use crate::netorca::{NetOrcaClient, NetOrcaError, Result};
use crate::resource::AttrValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const URL_ENV: &str = "NETORCA_URL";
pub const API_KEY_ENV: &str = "NETORCA_API_KEY";

/// Contents of `<config_dir>/netorca/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub apikey: Option<String>,
}

impl ConfigFile {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netorca").join("config.yaml"))
    }

    /// Load the user config file. A missing or unreadable file counts as empty.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Fully resolved provider inputs
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

struct Input {
    field: &'static str,
    label: &'static str,
    env_var: &'static str,
}

const URL_INPUT: Input = Input {
    field: "url",
    label: "URL",
    env_var: URL_ENV,
};

const API_KEY_INPUT: Input = Input {
    field: "apikey",
    label: "Api-Key",
    env_var: API_KEY_ENV,
};

impl ProviderConfig {
    /// Resolve from the provider block (`{url, apikey}`), an environment
    /// lookup and the config file.
    pub fn resolve<F>(explicit: &AttrValue, env: F, file: &ConfigFile) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = resolve_input(&URL_INPUT, explicit.get("url"), &env, file.url.as_deref())?;
        let api_key = resolve_input(
            &API_KEY_INPUT,
            explicit.get("apikey"),
            &env,
            file.apikey.as_deref(),
        )?;

        validate_url(&url)?;

        tracing::debug!("Resolved provider configuration for {}", url);
        Ok(Self { url, api_key })
    }

    /// Resolve against the process environment and the user config file
    pub fn from_environment(explicit: &AttrValue) -> Result<Self> {
        Self::resolve(explicit, |key| std::env::var(key).ok(), &ConfigFile::load())
    }

    /// Build the client shared by every handler
    pub fn build_client(&self) -> Result<Arc<NetOrcaClient>> {
        Ok(Arc::new(NetOrcaClient::new(&self.url, &self.api_key)?))
    }
}

fn resolve_input<F>(
    input: &Input,
    explicit: Option<&AttrValue>,
    env: &F,
    file: Option<&str>,
) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match explicit {
        Some(AttrValue::Unknown) => {
            return Err(NetOrcaError::Config {
                field: input.field,
                summary: format!("Unknown NetOrca API {}", input.label),
                detail: format!(
                    "The provider cannot create the NetOrca API client as there is an unknown configuration value for the NetOrca API {}. Either set the value statically in the configuration, or use the {} environment variable.",
                    input.label, input.env_var
                ),
            });
        }
        Some(AttrValue::String(s)) if !s.is_empty() => return Ok(s.clone()),
        None | Some(AttrValue::Null) | Some(AttrValue::String(_)) => {}
        Some(_) => {
            return Err(NetOrcaError::Config {
                field: input.field,
                summary: format!("Invalid NetOrca API {}", input.label),
                detail: format!("The {} attribute must be a string.", input.field),
            });
        }
    }

    env(input.env_var)
        .filter(|v| !v.is_empty())
        .or_else(|| file.filter(|v| !v.is_empty()).map(String::from))
        .ok_or_else(|| NetOrcaError::Config {
            field: input.field,
            summary: format!("Missing NetOrca API {}", input.label),
            detail: format!(
                "The provider cannot create the NetOrca API client as there is a missing or empty value for the NetOrca API {}. Set the {} value in the configuration or use the {} environment variable.",
                input.label, input.field, input.env_var
            ),
        })
}

fn validate_url(value: &str) -> Result<()> {
    let invalid = |detail: String| NetOrcaError::Config {
        field: "url",
        summary: "Invalid NetOrca API URL".to_string(),
        detail,
    };

    let parsed = url::Url::parse(value).map_err(|e| invalid(format!("{}: {}", value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}' in {}", other, value))),
    }
}
