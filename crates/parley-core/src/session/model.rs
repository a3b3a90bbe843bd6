//! Session domain model.

use super::message::{Message, now_millis};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to sessions created through "new chat".
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Title used when the first message carries attachments but no text.
pub const ATTACHMENT_ONLY_TITLE: &str = "File analysis";

/// Maximum number of characters taken from the first message for a title.
pub const TITLE_MAX_CHARS: usize = 30;

/// One persisted conversation thread.
///
/// The title is fixed once the first user message lands; `messages` only
/// ever grows at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// Conversation history in insertion order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time in Unix epoch milliseconds
    pub created_at: i64,
}

impl Session {
    /// Creates an empty session with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// Returns true when no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Derives a session title from the text of its first user message.
///
/// Takes the first [`TITLE_MAX_CHARS`] characters of the trimmed text, or
/// [`ATTACHMENT_ONLY_TITLE`] when nothing is left.
pub fn derive_title(text: &str) -> String {
    let title: String = text.trim().chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        ATTACHMENT_ONLY_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_short_text() {
        assert_eq!(derive_title("hello"), "hello");
    }

    #[test]
    fn test_derive_title_truncates_to_thirty_chars() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(derive_title(text), "abcdefghijklmnopqrstuvwxyz0123");
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let text = "مرحبا بك في المحادثة الجديدة هنا الآن";
        let title = derive_title(text);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
        assert!(text.starts_with(&title));
    }

    #[test]
    fn test_derive_title_falls_back_when_blank() {
        assert_eq!(derive_title(""), ATTACHMENT_ONLY_TITLE);
        assert_eq!(derive_title("   "), ATTACHMENT_ONLY_TITLE);
    }

    #[test]
    fn test_session_deserializes_without_messages() {
        let json = r#"{"id":"s-1","title":"t","createdAt":5}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.is_empty());
        assert_eq!(session.created_at, 5);
    }
}
