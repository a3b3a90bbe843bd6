//! Per-turn options chosen by the user.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Assistant mode; selects an extra system instruction for the turn.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatMode {
    #[default]
    General,
    Study,
    Math,
    Research,
}

/// Options bundle sent with every remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    /// Larger reasoning budget and lower temperature
    pub deep_thinking: bool,
    /// Lets the model search the web while answering
    pub web_search: bool,
    pub mode: ChatMode,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            deep_thinking: true,
            web_search: true,
            mode: ChatMode::General,
        }
    }
}
