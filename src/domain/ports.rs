use crate::domain::model::{PortProfile, ServerSettings};
use std::time::Duration;

/// A source of port profiles and process-wide startup settings.
pub trait ConfigProvider: Send + Sync {
    fn port_profiles(&self) -> &[PortProfile];
    fn startup_delay(&self) -> Duration;
}

impl ConfigProvider for ServerSettings {
    fn port_profiles(&self) -> &[PortProfile] {
        &self.profiles
    }

    fn startup_delay(&self) -> Duration {
        self.startup_delay
    }
}
