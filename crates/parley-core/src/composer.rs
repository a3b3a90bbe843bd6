//! Message Composer.
//!
//! Shapes data between the local [`Message`] model and the remote turn
//! format: local history into [`RemoteTurn`]s, the pending input into the
//! current turn, and a [`RemoteReply`] back into an assistant message.

use crate::attachment::{Attachment, FALLBACK_MIME_TYPE};
use crate::chat::{RemotePart, RemoteReply, RemoteTurn, TurnRole};
use crate::session::{Message, MessageRole, Session};

/// Strips an optional `data:...;base64,` prefix from an attachment payload.
///
/// The split point is the first comma; without one the whole string is
/// already raw base64.
pub fn extract_base64_payload(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

fn attachment_part(attachment: &Attachment) -> RemotePart {
    let mime_type = if attachment.mime_type.is_empty() {
        FALLBACK_MIME_TYPE.to_string()
    } else {
        attachment.mime_type.clone()
    };
    RemotePart::InlineData {
        mime_type,
        data: extract_base64_payload(&attachment.data).to_string(),
    }
}

fn turn_role(role: MessageRole) -> TurnRole {
    match role {
        MessageRole::User => TurnRole::User,
        MessageRole::Assistant => TurnRole::Model,
    }
}

/// Maps a stored message to a remote turn.
///
/// Attachments come first, followed by exactly one text part, which may be
/// empty.
pub fn message_to_turn(message: &Message) -> RemoteTurn {
    let mut parts: Vec<RemotePart> = message.attachments().iter().map(attachment_part).collect();
    parts.push(RemotePart::Text(message.content.clone()));
    RemoteTurn {
        role: turn_role(message.role),
        parts,
    }
}

/// Converts a session's messages into the ordered remote history.
pub fn build_history(session: &Session) -> Vec<RemoteTurn> {
    build_history_from(&session.messages)
}

/// Converts a slice of messages into remote turns, preserving order.
pub fn build_history_from(messages: &[Message]) -> Vec<RemoteTurn> {
    messages.iter().map(message_to_turn).collect()
}

/// Builds the turn being sent now.
///
/// Unlike history turns, the text part is only added when the prompt has
/// visible content.
pub fn build_current_turn(prompt: &str, attachments: &[Attachment]) -> RemoteTurn {
    let mut parts: Vec<RemotePart> = attachments.iter().map(attachment_part).collect();
    if !prompt.trim().is_empty() {
        parts.push(RemotePart::Text(prompt.to_string()));
    }
    RemoteTurn {
        role: TurnRole::User,
        parts,
    }
}

/// Turns pending input into an outbound user message.
pub fn build_user_message(text: &str, attachments: Vec<Attachment>) -> Message {
    Message::user(text, attachments)
}

/// Wraps a remote reply into a fresh assistant message.
///
/// Blank thinking traces and empty citation lists are stored as absent.
pub fn build_reply_message(reply: RemoteReply) -> Message {
    let thinking = reply.thinking.filter(|trace| !trace.trim().is_empty());
    let grounding_urls = if reply.citations.is_empty() {
        None
    } else {
        Some(reply.citations)
    };
    Message::assistant(reply.text, thinking, grounding_urls)
}
