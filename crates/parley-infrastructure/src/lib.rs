pub mod attachment_reader;
pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::attachment_reader::{AttachmentReader, IngestReport};
pub use crate::config_service::ConfigService;
pub use crate::paths::ParleyPaths;
pub use crate::storage::FileKeyValueStore;
