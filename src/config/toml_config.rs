use crate::config::env::clamp_startup_delay;
use crate::core::ConfigProvider;
use crate::domain::model::{PortProfile, ServerSettings};
use crate::utils::error::{Result, ServerError};
use crate::utils::validation::{validate_unique_ports, Validate};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// On-disk layout:
///
/// ```toml
/// startup_delay = 5
///
/// [[ports]]
/// port = 9001
/// response = "slow backend"
/// status_code = 200
/// response_delay = 3.0
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlFile {
    #[serde(default)]
    startup_delay: i64,
    #[serde(default)]
    ports: Vec<PortEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortEntry {
    port: u16,
    response: Option<String>,
    status_code: Option<u16>,
    response_delay: Option<f64>,
}

impl From<PortEntry> for PortProfile {
    fn from(entry: PortEntry) -> Self {
        let mut profile = PortProfile::new(entry.port);
        if let Some(response) = entry.response {
            profile.response_body = response;
        }
        if let Some(status_code) = entry.status_code {
            profile.status_code = status_code;
        }
        if let Some(delay) = entry.response_delay {
            profile.response_delay_secs = delay;
        }
        profile
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TomlConfig {
    settings: ServerSettings,
}

impl TomlConfig {
    /// Loads and validates a TOML port profile file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: TomlFile = toml::from_str(content)?;
        let config = Self {
            settings: ServerSettings {
                profiles: file.ports.into_iter().map(PortProfile::from).collect(),
                startup_delay: clamp_startup_delay(file.startup_delay),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn into_settings(self) -> ServerSettings {
        self.settings
    }
}

impl ConfigProvider for TomlConfig {
    fn port_profiles(&self) -> &[PortProfile] {
        &self.settings.profiles
    }

    fn startup_delay(&self) -> Duration {
        self.settings.startup_delay
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_unique_ports(&self.settings.profiles)?;
        self.settings.profiles.iter().try_for_each(Validate::validate)
    }
}
