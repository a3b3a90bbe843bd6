//! Chat request/response contract.

mod options;
mod remote;

pub use options::{ChatMode, ChatOptions};
pub use remote::{
    ChatRequest, RemoteChatAdapter, RemoteChatError, RemotePart, RemoteReply, RemoteTurn,
    TurnRole,
};
