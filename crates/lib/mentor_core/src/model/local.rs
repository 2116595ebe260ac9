// @awa-component: RELAY-LocalModel
//
//! Local deterministic chat model.
//!
//! Echoes every message back with its turn number. No network access, so it
//! suits offline development and tests.

use async_trait::async_trait;

use super::{ChatModel, Conversation, UpstreamError};
use crate::config::GenerationParams;

#[derive(Debug, Default)]
pub struct LocalModel;

impl LocalModel {
    pub fn new() -> Self {
        Self
    }
}

impl ChatModel for LocalModel {
    fn start_chat(
        &self,
        instruction: &'static str,
        _params: &GenerationParams,
    ) -> Result<Box<dyn Conversation>, UpstreamError> {
        Ok(Box::new(LocalConversation {
            instruction,
            history: Vec::new(),
        }))
    }

    fn name(&self) -> &str {
        "local"
    }
}

struct LocalConversation {
    instruction: &'static str,
    history: Vec<String>,
}

#[async_trait]
impl Conversation for LocalConversation {
    async fn send_message(&mut self, text: &str) -> Result<String, UpstreamError> {
        let turn = self.history.len() / 2 + 1;
        let persona = self.instruction.lines().next().unwrap_or_default();
        let reply = format!("[turn {turn}] {text}\n\n(local model; persona: {persona})");
        self.history.push(text.to_string());
        self.history.push(reply.clone());
        Ok(reply)
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_counts_turns() {
        let model = LocalModel::new();
        let mut chat = model
            .start_chat("You are a mentor.", &GenerationParams::default())
            .unwrap();

        let first = chat.send_message("hello").await.unwrap();
        let second = chat.send_message("again").await.unwrap();

        assert!(first.starts_with("[turn 1] hello"));
        assert!(second.starts_with("[turn 2] again"));
        assert_eq!(chat.history_len(), 4);
    }

    #[tokio::test]
    async fn echo_is_deterministic() {
        let model = LocalModel::new();
        let mut a = model.start_chat("I", &GenerationParams::default()).unwrap();
        let mut b = model.start_chat("I", &GenerationParams::default()).unwrap();
        assert_eq!(
            a.send_message("same").await.unwrap(),
            b.send_message("same").await.unwrap()
        );
    }
}
