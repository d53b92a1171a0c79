//! Config file location
//!
//! ## Resolution Order
//!
//! 1. `SNAPKEEPER_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/snapkeeper` or `~/.config/snapkeeper`
//! 3. Windows: `%APPDATA%\snapkeeper`
//!
//! An explicit `--config` flag or `SNAPKEEPER_CONFIG` takes precedence over
//! all of these; that is handled by the command line.

use std::path::{Path, PathBuf};

use crate::error::KeeperError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SNAPKEEPER_CONFIG_DIR";

/// Locates snapkeeper's configuration
#[derive(Debug, Clone)]
pub struct KeeperPaths {
    base_dir: PathBuf,
}

impl KeeperPaths {
    /// Resolve the config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, KeeperError> {
        let base_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(custom) => PathBuf::from(custom),
            Err(_) => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The default job file, `config.yml` in the base directory
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.yml")
    }

    /// The default job file, if one has been created
    pub fn existing_config_file(&self) -> Option<PathBuf> {
        Some(self.config_file()).filter(|path| path.is_file())
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, KeeperError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                KeeperError::Config("Could not determine the home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("snapkeeper"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, KeeperError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| KeeperError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("snapkeeper"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeeperPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.config_file(), temp_dir.path().join("config.yml"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(CONFIG_DIR_ENV, temp_dir.path());
        let paths = KeeperPaths::new().unwrap();
        env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_existing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeeperPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(paths.existing_config_file().is_none());

        fs::write(paths.config_file(), "jobs:\n").unwrap();
        assert_eq!(paths.existing_config_file(), Some(paths.config_file()));
    }
}
