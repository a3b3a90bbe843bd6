//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`) and title rules
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `store`: The owned session store (`SessionStore`)
//!
//! # Usage
//!
//! ```ignore
//! use parley_core::session::{Session, SessionStore, SessionTarget};
//! use parley_core::session::{Message, MessageRole};
//! ```

mod message;
mod model;
mod store;

#[cfg(test)]
mod store_test;

pub use message::{GroundingUrl, Message, MessageRole};
pub use model::{
    ATTACHMENT_ONLY_TITLE, DEFAULT_SESSION_TITLE, Session, TITLE_MAX_CHARS, derive_title,
};
pub use store::{SessionStore, SessionTarget};
