pub mod dispatcher;
pub mod listener;
pub mod readiness;
pub mod server;
pub mod shutdown;

pub use crate::domain::model::{PortProfile, ServerSettings};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
