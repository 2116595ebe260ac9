// @awa-component: RELAY-GeminiModel
//
//! Google Gemini chat model.
//!
//! Calls `POST {base}/v1beta/models/{model}:generateContent` with the full
//! conversation on every turn. The API is stateless, so the conversation
//! history lives in [`GeminiConversation`].

use std::env;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{ChatModel, Conversation, UpstreamError};
use crate::config::GenerationParams;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client-side ceiling for one HTTP exchange. The relay applies its own,
/// usually shorter, deadline on top.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API base URL, overridable for proxies and tests.
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                              | Default                                      |
    /// |---------------------------------------|----------------------------------------------|
    /// | `GEMINI_API_KEY` / `GOOGLE_API_KEY`   | none                                         |
    /// | `GEMINI_MODEL`                        | `gemini-1.5-flash`                           |
    /// | `GEMINI_BASE_URL`                     | `https://generativelanguage.googleapis.com`  |
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn turn(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl From<&GenerationParams> for GenerationConfig {
    fn from(p: &GenerationParams) -> Self {
        Self {
            max_output_tokens: p.max_output_tokens,
            temperature: p.temperature,
            top_p: p.top_p,
            top_k: p.top_k,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Gemini-backed [`ChatModel`]. Shares one connection pool across conversations.
pub struct GeminiModel {
    client: Client,
    config: GeminiConfig,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Build the `generateContent` endpoint for the configured model.
    fn endpoint(&self) -> Result<Url, UpstreamError> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.config.model
        ))
        .map_err(|e| UpstreamError::Config(format!("invalid Gemini base URL: {e}")))
    }
}

impl ChatModel for GeminiModel {
    fn start_chat(
        &self,
        instruction: &'static str,
        params: &GenerationParams,
    ) -> Result<Box<dyn Conversation>, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or_else(|| UpstreamError::Config("GEMINI_API_KEY is not set".to_string()))?;
        if self.config.model.trim().is_empty() {
            return Err(UpstreamError::Config("model name is empty".to_string()));
        }
        let endpoint = self.endpoint()?;

        Ok(Box::new(GeminiConversation {
            client: self.client.clone(),
            endpoint,
            api_key,
            instruction,
            params: params.clone(),
            history: Vec::new(),
        }))
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

/// Conversation state for one relay session.
pub struct GeminiConversation {
    client: Client,
    endpoint: Url,
    api_key: String,
    instruction: &'static str,
    params: GenerationParams,
    history: Vec<Content>,
}

impl GeminiConversation {
    async fn generate(&self, contents: &[Content]) -> Result<String, UpstreamError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: self.instruction.to_string(),
                }],
            },
            contents,
            generation_config: GenerationConfig::from(&self.params),
        };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let data: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(UpstreamError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send_message(&mut self, text: &str) -> Result<String, UpstreamError> {
        let mut contents = self.history.clone();
        contents.push(Content::turn("user", text));

        debug!(turns = contents.len(), "sending Gemini request");
        let reply = self.generate(&contents).await?;

        contents.push(Content::turn("model", &reply));
        self.history = contents;
        Ok(reply)
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}

fn map_transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

/// Extract `error.status: error.message` from a Gemini error body, falling
/// back to the raw body.
fn error_message(raw: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(raw) {
        Ok(env) if !env.error.status.is_empty() => {
            format!("{}: {}", env.error.status, env.error.message)
        }
        Ok(env) => env.error.message,
        Err(_) => raw.to_string(),
    }
}
