//! Chat backend collaborator
//!
//! The catch-all command forwards the utterance to an OpenAI-style chat
//! completions endpoint. Transport failures are never swallowed here; the
//! dispatcher and session loop decide what to do with them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChatConfig;

/// Fixed system instruction sent with every completion request.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

/// Errors from the chat backend.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(#[source] Box<ureq::Error>),

    #[error("failed to decode chat response: {0}")]
    Decode(#[from] std::io::Error),

    #[error("chat response contained no choices")]
    EmptyResponse,
}

impl From<ureq::Error> for ChatError {
    fn from(err: ureq::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Request/response text service used by chat-backend commands.
pub trait ChatBackend: Send + Sync {
    /// Send a prompt and return the textual completion.
    fn complete(&self, prompt: &str) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Blocking client for an OpenAI-style `/chat/completions` endpoint.
pub struct OpenAiClient {
    agent: ureq::Agent,
    config: ChatConfig,
}

impl OpenAiClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: ChatConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { agent, config }
    }
}

impl ChatBackend for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(model = %self.config.model, "sending chat completion request");

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response: ChatResponse = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(request)?
            .into_json()?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?;

        debug!("chat completion received");
        Ok(choice.message.content)
    }
}
