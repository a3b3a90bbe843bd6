pub mod bootstrap;
pub mod chat_usecase;
pub mod pending_attachments;

pub use bootstrap::{AppBootstrap, BootstrapOptions};
pub use chat_usecase::{ChatUseCase, SendOutcome};
pub use pending_attachments::PendingAttachments;
