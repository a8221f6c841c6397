//! Engine configuration: serde structs with canonical defaults and RON
//! file persistence.

pub mod config;
pub mod error;

pub use config::{Config, DebugConfig, NetworkConfig, WorldConfig};
pub use error::ConfigError;
