//! Wiring of the on-disk services into a ready-to-use [`ChatUseCase`].

use crate::chat_usecase::ChatUseCase;
use anyhow::{Context, Result, anyhow};
use parley_core::chat::RemoteChatAdapter;
use parley_core::config::RootConfig;
use parley_core::session::SessionStore;
use parley_infrastructure::{ConfigService, FileKeyValueStore, ParleyPaths};
use parley_interaction::GeminiChatAdapter;
use std::path::PathBuf;
use std::sync::Arc;

/// Overrides supplied by the front end (usually from the command line).
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Root directory replacing `~/.config/parley`
    pub data_dir: Option<PathBuf>,
    /// Config file replacing `<data_dir>/config.toml`
    pub config_file: Option<PathBuf>,
}

pub struct AppBootstrap {
    pub paths: ParleyPaths,
    pub config: RootConfig,
}

impl AppBootstrap {
    /// Resolves paths and loads the configuration.
    pub fn load(options: &BootstrapOptions) -> Result<Self> {
        let paths = ParleyPaths::new(options.data_dir.as_deref());
        let config_file = match &options.config_file {
            Some(path) => path.clone(),
            None => paths
                .config_file()
                .map_err(|e| anyhow!("Failed to resolve config file: {}", e))?,
        };

        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let config = ConfigService::new(config_file.clone()).get_config();
        tracing::info!("[Bootstrap] Loaded config from {:?}", config_file);

        Ok(Self { paths, config })
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        self.paths
            .logs_dir()
            .map_err(|e| anyhow!("Failed to resolve log directory: {}", e))
    }

    /// Opens the session store and wires it to `adapter`.
    pub fn build_chat(&self, adapter: Arc<dyn RemoteChatAdapter>) -> Result<ChatUseCase> {
        let store_dir = self
            .paths
            .store_dir()
            .map_err(|e| anyhow!("Failed to resolve store directory: {}", e))?;
        let kv = FileKeyValueStore::new(&store_dir)
            .with_context(|| format!("Failed to open store at {}", store_dir.display()))?;

        let store = SessionStore::init(Arc::new(kv));
        tracing::info!(
            "[Bootstrap] Restored {} session(s) from {:?}",
            store.len(),
            store_dir
        );

        Ok(ChatUseCase::new(store, adapter, self.config.chat.into()))
    }

    /// Builds the use case against the Gemini API, reading the key from the
    /// environment.
    pub fn build_gemini_chat(&self) -> Result<ChatUseCase> {
        let adapter = GeminiChatAdapter::try_from_env(self.config.gemini.clone())
            .context("Gemini API key is not configured")?;
        tracing::info!("[Bootstrap] Using Gemini model {}", adapter.model());
        self.build_chat(Arc::new(adapter))
    }
}
