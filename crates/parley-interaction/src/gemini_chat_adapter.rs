//! GeminiChatAdapter - Direct REST API binding for Gemini `generateContent`.
//!
//! The API key is read from the environment and never leaves this module.

use crate::instructions::system_instruction;
use async_trait::async_trait;
use parley_core::chat::{
    ChatRequest, RemoteChatAdapter, RemoteChatError, RemotePart, RemoteReply, RemoteTurn,
};
use parley_core::config::GeminiConfig;
use parley_core::session::GroundingUrl;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// [`RemoteChatAdapter`] that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiChatAdapter {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiChatAdapter {
    /// Creates a new adapter with the provided API key and settings.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, RemoteChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| RemoteChatError::Transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Reads the API key from `GEMINI_API_KEY` (or `API_KEY`).
    pub fn try_from_env(config: GeminiConfig) -> Result<Self, RemoteChatError> {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                RemoteChatError::Credential(format!(
                    "set one of {} to your Gemini API key",
                    API_KEY_ENV_VARS.join(", ")
                ))
            })?;

        Self::new(api_key, config)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RemoteChatError> {
        let url = format!(
            "{}/{model}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model = self.config.model
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| RemoteChatError::Transport(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response.json().await.map_err(|err| {
            RemoteChatError::MalformedResponse(format!("Failed to parse Gemini response: {err}"))
        })
    }
}

#[async_trait]
impl RemoteChatAdapter for GeminiChatAdapter {
    async fn send(&self, request: ChatRequest) -> Result<RemoteReply, RemoteChatError> {
        tracing::debug!(
            "[GeminiChatAdapter] Sending {} history turn(s) to {} (mode={}, deep_thinking={}, web_search={})",
            request.history.len(),
            self.config.model,
            request.options.mode,
            request.options.deep_thinking,
            request.options.web_search
        );

        let body = build_request(&request, &self.config);
        let response = self.send_request(&body).await?;
        let reply = parse_reply(response);

        tracing::debug!(
            "[GeminiChatAdapter] Reply: {} chars, {} citation(s), thinking={}",
            reply.text.chars().count(),
            reply.citations.len(),
            reply.thinking.is_some()
        );
        Ok(reply)
    }
}

// ============================================================================
// Request shaping
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
    include_thoughts: bool,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearchConfig,
}

#[derive(Debug, Serialize, Default)]
struct GoogleSearchConfig {}

fn to_part(part: &RemotePart) -> Part {
    match part {
        RemotePart::Text(text) => Part::Text { text: text.clone() },
        RemotePart::InlineData { mime_type, data } => Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: mime_type.clone(),
                data: data.clone(),
            },
        },
    }
}

fn to_content(turn: &RemoteTurn) -> Content {
    Content {
        role: Some(turn.role.as_str().to_string()),
        parts: turn.parts.iter().map(to_part).collect(),
    }
}

fn build_request(request: &ChatRequest, config: &GeminiConfig) -> GenerateContentRequest {
    let options = request.options;

    let mut contents: Vec<Content> = request.history.iter().map(to_content).collect();
    contents.push(to_content(&request.current));

    let generation_config = if options.deep_thinking {
        GenerationConfig {
            temperature: config.precise_temperature,
            thinking_config: Some(ThinkingConfig {
                thinking_budget: config.thinking_budget,
                include_thoughts: true,
            }),
        }
    } else {
        GenerationConfig {
            temperature: config.creative_temperature,
            thinking_config: None,
        }
    };

    let tools = if options.web_search {
        vec![Tool::default()]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: system_instruction(options.mode),
            }],
        },
        generation_config,
        tools,
    }
}

// ============================================================================
// Response shaping
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// Reads the first candidate: answer text from non-thought parts, the first
/// thought part as the trace, and only web grounding chunks as citations.
fn parse_reply(response: GenerateContentResponse) -> RemoteReply {
    let Some(candidate) = response.candidates.into_iter().next() else {
        tracing::warn!("[GeminiChatAdapter] Response carried no candidates");
        return RemoteReply::default();
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let thinking = parts
        .iter()
        .find(|part| part.thought)
        .and_then(|part| part.text.clone());

    let text = parts
        .iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    let citations = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri?;
            let title = web.title.unwrap_or_else(|| uri.clone());
            Some(GroundingUrl { uri, title })
        })
        .collect();

    RemoteReply {
        text,
        citations,
        thinking,
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn map_http_error(status: StatusCode, body: String) -> RemoteChatError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    RemoteChatError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::chat::{ChatMode, ChatOptions, TurnRole};
    use serde_json::{Value, json};

    fn request(options: ChatOptions) -> ChatRequest {
        ChatRequest {
            history: vec![
                RemoteTurn {
                    role: TurnRole::User,
                    parts: vec![RemotePart::Text("hi".to_string())],
                },
                RemoteTurn {
                    role: TurnRole::Model,
                    parts: vec![RemotePart::Text("hello".to_string())],
                },
            ],
            current: RemoteTurn {
                role: TurnRole::User,
                parts: vec![
                    RemotePart::InlineData {
                        mime_type: "image/png".to_string(),
                        data: "AAAA".to_string(),
                    },
                    RemotePart::Text("what is this?".to_string()),
                ],
            },
            options,
        }
    }

    fn body_json(options: ChatOptions) -> Value {
        serde_json::to_value(build_request(&request(options), &GeminiConfig::default())).unwrap()
    }

    #[test]
    fn test_request_contents_follow_history_then_current() {
        let body = body_json(ChatOptions::default());

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "hello");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["data"], "AAAA");
        assert_eq!(contents[2]["parts"][1]["text"], "what is this?");
        assert!(body["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_deep_thinking_and_search_enabled() {
        let body = body_json(ChatOptions {
            deep_thinking: true,
            web_search: true,
            mode: ChatMode::Research,
        });

        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            32768
        );
        assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
        let instruction = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("research assistant"));
    }

    #[test]
    fn test_deep_thinking_and_search_disabled() {
        let body = body_json(ChatOptions {
            deep_thinking: false,
            web_search: false,
            mode: ChatMode::General,
        });

        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_parse_reply_extracts_text_thinking_and_web_citations() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Let me think.", "thought": true },
                        { "text": "The answer " },
                        { "text": "is 42." }
                    ]
                },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example", "title": "A" } },
                        { "retrievedContext": { "uri": "gs://bucket/doc" } },
                        { "web": { "uri": "https://b.example" } }
                    ]
                }
            }]
        }))
        .unwrap();

        let reply = parse_reply(response);

        assert_eq!(reply.text, "The answer is 42.");
        assert_eq!(reply.thinking.as_deref(), Some("Let me think."));
        assert_eq!(
            reply.citations,
            vec![
                GroundingUrl {
                    uri: "https://a.example".to_string(),
                    title: "A".to_string(),
                },
                GroundingUrl {
                    uri: "https://b.example".to_string(),
                    title: "https://b.example".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_reply_without_candidates_is_empty() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "OTHER" } }))
                .unwrap();
        assert_eq!(parse_reply(response), RemoteReply::default());
    }

    #[test]
    fn test_map_http_error_reads_envelope() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        assert_eq!(
            err,
            RemoteChatError::Status {
                status: 429,
                message: "RESOURCE_EXHAUSTED: Quota exceeded".to_string(),
            }
        );
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(
            err,
            RemoteChatError::Status {
                status: 502,
                message: "upstream down".to_string(),
            }
        );
    }
}
