//! Config file loading and saving.
//!
//! The only config file is `<data dir>/config.toml`. A missing file yields
//! defaults; a file that fails to parse is an error so typos are not silently
//! ignored.

use std::path::Path;

use crate::{ClawLogConfig, ConfigError, DataPaths, Result};

/// Result of config loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The effective configuration.
    pub config: ClawLogConfig,
    /// Data directory the config was resolved against.
    pub paths: DataPaths,
    /// Whether `config.toml` existed and was loaded.
    pub loaded: bool,
}

/// Load `config.toml` from the data directory.
pub fn load_config(paths: &DataPaths) -> Result<LoadedConfig> {
    let path = paths.config_file();
    let (config, loaded) = if path.is_file() {
        (load_config_file(&path)?, true)
    } else {
        (ClawLogConfig::default(), false)
    };

    Ok(LoadedConfig {
        config,
        paths: paths.clone(),
        loaded,
    })
}

/// Load config from a specific file path.
pub fn load_config_file(path: &Path) -> Result<ClawLogConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    ClawLogConfig::from_toml(&contents)
}

/// Save configuration to a file.
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &ClawLogConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(&DataPaths::new(dir.path())).unwrap();
        assert!(!loaded.loaded);
        assert_eq!(loaded.config, ClawLogConfig::default());
    }

    #[test]
    fn test_load_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r#"
[auth]
open_browser = false

[http]
timeout_secs = 10
"#,
        )
        .unwrap();

        let loaded = load_config(&DataPaths::new(dir.path())).unwrap();
        assert!(loaded.loaded);
        assert!(!loaded.config.auth.open_browser);
        assert_eq!(loaded.config.http.timeout_secs, 10);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[auth\nopen_browser = ").unwrap();
        let result = load_config(&DataPaths::new(dir.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClawLogConfig::new();
        config.auth.open_browser = false;
        save_config(&config, &path).unwrap();

        assert_eq!(load_config_file(&path).unwrap(), config);
    }
}
