//! File-backed storage primitives.

mod atomic_file;
mod key_value_store;

pub use atomic_file::{AtomicFile, AtomicFileError, AtomicTomlFile};
pub use key_value_store::FileKeyValueStore;
