//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml`, writing the defaults on
//! first run so users have a file to edit.

use crate::storage::AtomicTomlFile;
use parley_core::config::RootConfig;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<RootConfig>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A missing file is created with defaults; an unparseable file yields
    /// the defaults and is left untouched.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config();

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> RootConfig {
        match self.file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let default_config = RootConfig::default();
                if let Err(e) = self.file.save(&default_config) {
                    tracing::warn!(
                        "[ConfigService] Failed to write default config to {:?}: {}",
                        self.file.path(),
                        e
                    );
                }
                default_config
            }
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Ignoring unreadable config {:?}: {}",
                    self.file.path(),
                    e
                );
                RootConfig::default()
            }
        }
    }
}
