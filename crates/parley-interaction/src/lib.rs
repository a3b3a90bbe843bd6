pub mod gemini_chat_adapter;
pub mod instructions;

pub use crate::gemini_chat_adapter::GeminiChatAdapter;
