// @awa-component: RELAY-ChatModel
//
//! Upstream chat models — the hosted generation API behind the relay.
//!
//! A [`ChatModel`] starts conversations; a [`Conversation`] owns its system
//! instruction, generation parameters and turn history, and is the only
//! thing that mutates that history.
//!
//! # Providers
//!
//! - `"gemini"` — Google Gemini `generateContent` API ([`gemini::GeminiModel`])
//! - `"local"` — Deterministic offline echo ([`local::LocalModel`])

pub mod gemini;
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GenerationParams;

/// Errors reported by an upstream model.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Model configuration error: {0}")]
    Config(String),

    #[error("Upstream returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream response parse error: {0}")]
    Decode(String),

    #[error("Upstream returned no text")]
    EmptyResponse,
}

/// Factory for stateful upstream conversations.
pub trait ChatModel: Send + Sync {
    /// Start a new conversation bound to `instruction` and `params`.
    ///
    /// Must not perform network I/O; failing here means the model or its
    /// configuration is unusable.
    fn start_chat(
        &self,
        instruction: &'static str,
        params: &GenerationParams,
    ) -> Result<Box<dyn Conversation>, UpstreamError>;

    /// Display name for logging.
    fn name(&self) -> &str;
}

/// One stateful upstream conversation.
#[async_trait]
pub trait Conversation: Send {
    /// Send a user message and return the model's reply.
    ///
    /// History is extended only once a reply has been received in full, so a
    /// dropped future leaves the conversation unchanged.
    async fn send_message(&mut self, text: &str) -> Result<String, UpstreamError>;

    /// Number of turns (user and model) recorded so far.
    fn history_len(&self) -> usize;
}

/// Which model implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Local,
}

impl Provider {
    /// Parse a provider name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "local" => Some(Provider::Local),
            _ => None,
        }
    }
}

/// Build the model for `provider`, reading provider settings from the environment.
pub fn from_env(provider: Provider) -> Result<Arc<dyn ChatModel>, UpstreamError> {
    match provider {
        Provider::Gemini => Ok(Arc::new(gemini::GeminiModel::new(
            gemini::GeminiConfig::from_env(),
        )?)),
        Provider::Local => Ok(Arc::new(local::LocalModel::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse() {
        assert_eq!(Provider::parse("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::parse(" Google "), Some(Provider::Gemini));
        assert_eq!(Provider::parse("local"), Some(Provider::Local));
        assert_eq!(Provider::parse("openai"), None);
    }

    #[test]
    fn local_provider_builds_without_credentials() {
        let model = from_env(Provider::Local).unwrap();
        assert_eq!(model.name(), "local");
    }
}
