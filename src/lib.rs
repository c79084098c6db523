pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{EnvConfig, TomlConfig};

pub use crate::core::{
    readiness::ReadinessGate,
    server::{BoundServer, MockServer},
    shutdown::{ShutdownCoordinator, ShutdownPhase},
};
pub use domain::model::{PortProfile, ServerSettings};
pub use utils::error::{Result, ServerError};
