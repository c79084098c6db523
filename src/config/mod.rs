pub mod env;
pub mod toml_config;

pub use env::EnvConfig;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::ServerSettings;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
#[cfg(feature = "cli")]
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "multiport-mock")]
#[command(about = "Multi-port HTTP mock server with canned responses and a startup window")]
pub struct CliConfig {
    #[arg(short, long, help = "Read port profiles from a TOML file instead of SERVER_PORT_*")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, default_value = "5", help = "Seconds to wait for in-flight requests on shutdown")]
    pub drain_timeout: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads settings from the TOML file when one is given, otherwise from
    /// the process environment.
    pub fn load_settings(&self) -> Result<ServerSettings> {
        match &self.config {
            Some(path) => Ok(TomlConfig::from_file(path)?.into_settings()),
            None => Ok(EnvConfig::from_env()?.into_settings()),
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout)
    }
}
