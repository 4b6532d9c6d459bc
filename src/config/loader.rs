//! Configuration loading and discovery for `animate-upgrade.toml`

use super::schema::UpgradeConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "animate-upgrade.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse animate-upgrade.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Find animate-upgrade.toml by walking up from the current working directory.
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Found config at: {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find animate-upgrade.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an animate-upgrade.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate one. Without a config file the defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<UpgradeConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(UpgradeConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<UpgradeConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: UpgradeConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputMode;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "");

        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "");
        let nested = temp.path().join("lib").join("scenes");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_from(nested), Some(path));
    }

    #[test]
    fn test_load_config_from_path() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[output]\nmode = \"es6\"\n\n[shapes]\nmigrate = false\n");

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.output.mode, OutputMode::Es6);
        assert!(!config.shapes.migrate);
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[output\nmode = ");

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[output]\nruntime_import = \"\"\n");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("output.runtime_import"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(Some(&temp.path().join(CONFIG_FILE_NAME)));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
