//! Configuration module for animate-upgrade
//!
//! Provides types and loading for the optional `animate-upgrade.toml` file.

pub mod loader;
pub mod schema;

pub use loader::{find_config, find_config_from, load_config, ConfigError, CONFIG_FILE_NAME};
pub use schema::*;
