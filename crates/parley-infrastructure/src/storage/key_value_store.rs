use super::atomic_file::AtomicFile;
use parley_core::error::{ParleyError, Result};
use parley_core::storage::KeyValueStore;
use std::path::{Path, PathBuf};

/// Directory-backed key-value store.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── chat_sessions.json
/// └── <key>.json
/// ```
///
/// Each value is replaced atomically through [`AtomicFile`].
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        validate_key(key)?;
        Ok(AtomicFile::new(self.base_dir.join(format!("{key}.json"))))
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ParleyError::validation(format!(
            "Invalid storage key '{key}'"
        )))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file_for(key)?.read()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key)?;
        file.write(value)?;
        tracing::trace!(
            "[FileKeyValueStore] Wrote {} bytes to {:?}",
            value.len(),
            file.path()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        Ok(self.file_for(key)?.remove()?)
    }
}
