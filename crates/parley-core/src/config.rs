use crate::chat::{ChatMode, ChatOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;
pub const DEFAULT_PRECISE_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_CREATIVE_TEMPERATURE: f32 = 0.7;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub gemini: GeminiConfig,
    pub chat: ChatDefaults,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            gemini: GeminiConfig::default(),
            chat: ChatDefaults::default(),
        }
    }
}

/// Settings of the Gemini binding. The API key is never stored here.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    /// Reasoning token budget requested when deep thinking is on
    pub thinking_budget: u32,
    /// Temperature used with deep thinking
    pub precise_temperature: f32,
    /// Temperature used without deep thinking
    pub creative_temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            precise_temperature: DEFAULT_PRECISE_TEMPERATURE,
            creative_temperature: DEFAULT_CREATIVE_TEMPERATURE,
            timeout_secs: 300,
        }
    }
}

/// Initial toggle state of a fresh front end.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ChatDefaults {
    pub deep_thinking: bool,
    pub web_search: bool,
    pub mode: ChatMode,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        let options = ChatOptions::default();
        Self {
            deep_thinking: options.deep_thinking,
            web_search: options.web_search,
            mode: options.mode,
        }
    }
}

impl From<ChatDefaults> for ChatOptions {
    fn from(defaults: ChatDefaults) -> Self {
        Self {
            deep_thinking: defaults.deep_thinking,
            web_search: defaults.web_search,
            mode: defaults.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [chat]
            mode = "math"
            web_search = false
            "#,
        )
        .unwrap();

        assert_eq!(config.chat.mode, ChatMode::Math);
        assert!(!config.chat.web_search);
        assert!(config.chat.deep_thinking);
        assert_eq!(config.gemini, GeminiConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_default_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&RootConfig::default()).unwrap();
        let parsed: RootConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, RootConfig::default());
    }
}
