//! CLI command handlers.

pub mod auth;

use clawlog_config::{ClawLogConfig, DataPaths};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Per-user data directory layout.
    pub paths: DataPaths,
    /// Settings from `config.toml`.
    pub config: ClawLogConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}
