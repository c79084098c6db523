use crate::core::ConfigProvider;
use crate::domain::model::{PortProfile, ServerSettings};
use crate::utils::error::{Result, ServerError};
use crate::utils::validation::{
    validate_non_negative, validate_range, validate_unique_ports, Validate, MAX_STATUS_CODE,
    MIN_STATUS_CODE,
};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Number of `SERVER_PORT_{n}` slots scanned at startup.
pub const MAX_PORT_SLOTS: usize = 5;

/// Port profiles read from `SERVER_PORT_{n}` style environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    settings: ServerSettings,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. An empty
    /// `SERVER_PORT_{n}` leaves the slot unused; any other empty numeric value
    /// is a parse error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut profiles = Vec::new();
        for slot in 1..=MAX_PORT_SLOTS {
            let port_key = format!("SERVER_PORT_{}", slot);
            let Some(raw_port) = lookup(&port_key).filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            let port: u16 = parse_value(&port_key, &raw_port)?;
            validate_range(&port_key, port, 1, u16::MAX)?;

            let mut profile = PortProfile::new(port);

            if let Some(body) = lookup(&format!("SERVER_RESPONSE_{}", slot)) {
                profile.response_body = body;
            }

            let status_key = format!("STATUS_CODE_{}", slot);
            if let Some(raw) = lookup(&status_key) {
                profile.status_code = parse_value(&status_key, &raw)?;
                validate_range(&status_key, profile.status_code, MIN_STATUS_CODE, MAX_STATUS_CODE)?;
            }

            let delay_key = format!("RESPONSE_DELAY_{}", slot);
            if let Some(raw) = lookup(&delay_key) {
                profile.response_delay_secs = parse_value(&delay_key, &raw)?;
                validate_non_negative(&delay_key, profile.response_delay_secs)?;
            }

            profiles.push(profile);
        }

        let startup_delay = match lookup("STARTUP_DELAY") {
            Some(raw) => clamp_startup_delay(parse_value("STARTUP_DELAY", &raw)?),
            None => Duration::ZERO,
        };

        let config = Self {
            settings: ServerSettings {
                profiles,
                startup_delay,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn into_settings(self) -> ServerSettings {
        self.settings
    }
}

impl ConfigProvider for EnvConfig {
    fn port_profiles(&self) -> &[PortProfile] {
        &self.settings.profiles
    }

    fn startup_delay(&self) -> Duration {
        self.settings.startup_delay
    }
}

impl Validate for EnvConfig {
    fn validate(&self) -> Result<()> {
        validate_unique_ports(&self.settings.profiles)?;
        self.settings.profiles.iter().try_for_each(Validate::validate)
    }
}

pub(crate) fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ServerError::invalid_value(key, raw, format!("Could not parse value: {}", e)))
}

/// Negative startup delays are clamped to zero rather than rejected.
pub(crate) fn clamp_startup_delay(seconds: i64) -> Duration {
    if seconds < 0 {
        tracing::warn!(
            "⚠️ STARTUP_DELAY={} is negative, starting without a startup window",
            seconds
        );
    }
    Duration::from_secs(seconds.max(0).unsigned_abs())
}
