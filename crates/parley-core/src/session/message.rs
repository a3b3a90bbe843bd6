//! Conversation message types.
//!
//! Messages are immutable once they are appended to a session; the store only
//! ever pushes new ones.

use crate::attachment::Attachment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply generated by the AI assistant.
    Assistant,
}

/// A web source the assistant cited while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingUrl {
    pub uri: String,
    pub title: String,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The text content of the message. May be empty for attachment-only turns.
    pub content: String,
    /// Creation time in Unix epoch milliseconds.
    pub timestamp: i64,
    /// Reasoning trace returned alongside an assistant reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Web citations returned alongside an assistant reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_urls: Option<Vec<GroundingUrl>>,
    /// Files sent with a user message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl Message {
    /// Creates a user message with a fresh id and the current timestamp.
    ///
    /// An empty attachment list is stored as `None`.
    pub fn user(content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: now_millis(),
            thinking: None,
            grounding_urls: None,
            attachments: if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            },
        }
    }

    /// Creates an assistant message with a fresh id and the current timestamp.
    pub fn assistant(
        content: impl Into<String>,
        thinking: Option<String>,
        grounding_urls: Option<Vec<GroundingUrl>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: now_millis(),
            thinking,
            grounding_urls,
            attachments: None,
        }
    }

    /// Attachments of this message, empty when there are none.
    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.as_deref().unwrap_or_default()
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
