//! Atomic file replacement with an advisory lock.
//!
//! Every write goes to a sibling temp file, is fsynced, then renamed over the
//! target, so readers observe either the old or the new content.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML deserialization error.
    TomlError(toml::de::Error),
    /// TOML serialization error.
    TomlSerError(toml::ser::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::TomlError(e) => write!(f, "TOML parse error: {}", e),
            AtomicFileError::TomlSerError(e) => write!(f, "TOML serialization error: {}", e),
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

impl From<toml::de::Error> for AtomicFileError {
    fn from(e: toml::de::Error) -> Self {
        AtomicFileError::TomlError(e)
    }
}

impl From<toml::ser::Error> for AtomicFileError {
    fn from(e: toml::ser::Error) -> Self {
        AtomicFileError::TomlSerError(e)
    }
}

impl From<AtomicFileError> for parley_core::ParleyError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::IoError(io) => io.into(),
            AtomicFileError::TomlError(de) => de.into(),
            AtomicFileError::TomlSerError(ser) => ser.into(),
            AtomicFileError::LockError(message) => parley_core::ParleyError::io(message),
        }
    }
}

/// A handle to a file that is only ever replaced as a whole.
///
/// Provides:
/// - **Atomicity**: tmp file + rename
/// - **Isolation**: an exclusive lock file around writes
/// - **Durability**: fsync before rename
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file.
    ///
    /// - `Ok(Some(content))`: file exists
    /// - `Ok(None)`: file doesn't exist
    /// - `Err`: file exists but could not be read
    pub fn read(&self) -> Result<Option<String>, AtomicFileError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file content atomically while holding the lock.
    pub fn write(&self, content: &str) -> Result<(), AtomicFileError> {
        let _lock = FileLock::acquire(&self.path)?;
        self.write_unlocked(content)
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<(), AtomicFileError> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_unlocked(&self, content: &str) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Typed TOML view over an [`AtomicFile`].
#[derive(Debug, Clone)]
pub struct AtomicTomlFile<T> {
    file: AtomicFile,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads and parses the file; `None` when missing or blank.
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        match self.file.read()? {
            Some(content) if !content.trim().is_empty() => Ok(Some(toml::from_str(&content)?)),
            _ => Ok(None),
        }
    }

    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let rendered = toml::to_string_pretty(data)?;
        self.file.write(&rendered)
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                AtomicFileError::LockError(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // best effort
        let _ = fs::remove_file(&self.lock_path);
    }
}
