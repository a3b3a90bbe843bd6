//! Contract of the remote chat service.
//!
//! The core shapes requests into [`RemoteTurn`]s and reads back a
//! [`RemoteReply`]; the concrete HTTP binding lives in `parley-interaction`.

use super::options::ChatOptions;
use crate::attachment::Attachment;
use crate::session::GroundingUrl;
use async_trait::async_trait;
use thiserror::Error;

/// Role of a turn in the remote protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One piece of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemotePart {
    Text(String),
    /// Raw base64 payload, already stripped of any `data:` prefix.
    InlineData { mime_type: String, data: String },
}

/// One request/response unit of the conversation, tagged with a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTurn {
    pub role: TurnRole,
    pub parts: Vec<RemotePart>,
}

impl RemoteTurn {
    /// Concatenated text parts, mostly useful in logs and tests.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                RemotePart::Text(text) => Some(text.as_str()),
                RemotePart::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Everything the remote service needs for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Prior conversation, oldest first, excluding the current turn.
    pub history: Vec<RemoteTurn>,
    /// The turn being sent now.
    pub current: RemoteTurn,
    pub options: ChatOptions,
}

/// What the remote service produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReply {
    /// Generated answer; may be empty.
    pub text: String,
    /// Web citations, in the order the service returned them.
    pub citations: Vec<GroundingUrl>,
    /// Internal reasoning trace, when the service returned one.
    pub thinking: Option<String>,
}

/// Failure of a remote call. The caller treats every variant the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteChatError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("missing credential: {0}")]
    Credential(String),
}

/// The sole integration point with the hosted AI service.
#[async_trait]
pub trait RemoteChatAdapter: Send + Sync {
    /// Performs one generation for `request`.
    async fn send(&self, request: ChatRequest) -> Result<RemoteReply, RemoteChatError>;
}
