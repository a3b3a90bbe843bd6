//! Unified path management for Parley files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/parley/            # Config directory (platform default via `dirs`)
//! ├── config.toml              # Application configuration
//! ├── store/                   # Key-value slots (FileKeyValueStore)
//! │   └── chat_sessions.json
//! └── logs/                    # Application logs
//!     └── parley.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "parley";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find the config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every Parley path from one base directory.
///
/// With no explicit base, the platform config directory is used
/// (`~/.config/parley` on Linux).
#[derive(Debug, Clone, Default)]
pub struct ParleyPaths {
    base: Option<PathBuf>,
}

impl ParleyPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the root directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the key-value store directory.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("store"))
    }

    /// Returns the log directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base() {
        let paths = ParleyPaths::new(Some(Path::new("/tmp/parley-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/parley-test/config.toml")
        );
        assert_eq!(
            paths.store_dir().unwrap(),
            PathBuf::from("/tmp/parley-test/store")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/parley-test/logs")
        );
    }
}
