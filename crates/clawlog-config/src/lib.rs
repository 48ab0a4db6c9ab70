//! Configuration for claw-log.
//!
//! Provides:
//! - The per-user data directory (`~/.claw-log`, overridable with `CLAW_LOG_HOME`)
//! - TOML settings from `config.toml` in that directory

pub mod discovery;
pub mod error;
pub mod paths;
pub mod types;

pub use discovery::{LoadedConfig, load_config, load_config_file, save_config};
pub use error::{ConfigError, Result};
pub use paths::DataPaths;
pub use types::*;
