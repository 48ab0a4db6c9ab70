//! Per-user data directory layout.
//!
//! ```text
//! ~/.claw-log/
//! ├── config.toml
//! ├── oauth_tokens.json
//! └── logs/
//! ```
//!
//! # Environment Variables
//!
//! - `CLAW_LOG_HOME` - Override the data directory

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result};

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "CLAW_LOG_HOME";

/// Directory name under the user's home.
const DIR_NAME: &str = ".claw-log";

/// Config filename within the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Token filename within the data directory.
pub const TOKEN_FILE: &str = "oauth_tokens.json";

/// Log directory name within the data directory.
const LOG_DIR: &str = "logs";

/// Resolved locations of everything claw-log keeps per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    base: PathBuf,
}

impl DataPaths {
    /// Use an explicit base directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve from `CLAW_LOG_HOME`, falling back to `~/.claw-log`.
    pub fn resolve() -> Result<Self> {
        resolve_base(std::env::var(HOME_ENV).ok(), dirs::home_dir()).map(Self::new)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    pub fn token_file(&self) -> PathBuf {
        self.base.join(TOKEN_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base.join(LOG_DIR)
    }
}

fn resolve_base(env_value: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_value
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(DIR_NAME)).ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let base = resolve_base(
            Some("/tmp/claw".to_string()),
            Some(PathBuf::from("/home/u")),
        )
        .unwrap();
        assert_eq!(base, PathBuf::from("/tmp/claw"));
    }

    #[test]
    fn test_empty_env_falls_back_to_home() {
        let base = resolve_base(Some(String::new()), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(base, PathBuf::from("/home/u/.claw-log"));
    }

    #[test]
    fn test_no_home() {
        assert!(matches!(
            resolve_base(None, None),
            Err(ConfigError::NoHomeDir)
        ));
    }

    #[test]
    fn test_layout() {
        let paths = DataPaths::new("/data");
        assert_eq!(paths.config_file(), PathBuf::from("/data/config.toml"));
        assert_eq!(paths.token_file(), PathBuf::from("/data/oauth_tokens.json"));
        assert_eq!(paths.log_dir(), PathBuf::from("/data/logs"));
    }
}
