//! Intent classification - turns a player utterance into an intent and HAVEN's reply.
//!
//! The language model sits behind [`CompletionBackend`]. [`LlmClassifier`]
//! assembles the conversation for it and fails closed: any backend or parse
//! failure becomes [`Intent::Unknown`] with an in-character line, so the state
//! machine never sees an error.

mod reply;

pub use reply::*;

use bunker_rules::{Ending, Intent, Phase};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{FallbackConfig, HavenConfig, ModelConfig};
use crate::prompts::system_prompt;
use crate::session::{recent, Exchange};

/// Everything the classifier sees for one player message.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRequest<'a> {
    /// Phase before the message is applied.
    pub phase: Phase,
    pub ending: Option<Ending>,
    /// Full conversation so far; classifiers pick their own window.
    pub history: &'a [Exchange],
    pub utterance: &'a str,
}

/// Classified intent plus HAVEN's generated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub response: String,
}

impl Classification {
    pub fn new(intent: Intent, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
        }
    }

    /// A no-op classification carrying a fallback line.
    pub fn unknown(response: impl Into<String>) -> Self {
        Self::new(Intent::Unknown, response)
    }
}

/// Classifies player utterances. Implementations must not fail.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, request: &ClassificationRequest<'_>) -> Classification;
}

/// Errors from a completion backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the backend to constrain output to a JSON object.
    pub json_response: bool,
}

/// A chat completion service. Returns the raw text of the first choice.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}

/// Classifier backed by a chat completion model.
pub struct LlmClassifier<B> {
    backend: B,
    model: ModelConfig,
    history_window: usize,
    fallback: FallbackConfig,
}

impl<B: CompletionBackend> LlmClassifier<B> {
    /// Create a classifier with default settings.
    pub fn new(backend: B) -> Self {
        Self::from_config(backend, &HavenConfig::default())
    }

    pub fn from_config(backend: B, config: &HavenConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            history_window: config.conversation.history_window,
            fallback: config.fallback.clone(),
        }
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the completion request for a player message.
    ///
    /// System prompt first, then the recent exchanges as user/assistant pairs,
    /// then the new utterance.
    pub fn build_request(&self, request: &ClassificationRequest<'_>) -> CompletionRequest {
        let window = recent(request.history, self.history_window);

        let mut messages = Vec::with_capacity(window.len() * 2 + 2);
        messages.push(ChatMessage::system(system_prompt(
            request.phase,
            request.ending,
        )));
        for exchange in window {
            messages.push(ChatMessage::user(exchange.player.clone()));
            messages.push(ChatMessage::assistant(exchange.haven.clone()));
        }
        messages.push(ChatMessage::user(request.utterance));

        CompletionRequest {
            model: self.model.name.clone(),
            messages,
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
            json_response: true,
        }
    }
}

impl<B: CompletionBackend> IntentClassifier for LlmClassifier<B> {
    fn classify(&self, request: &ClassificationRequest<'_>) -> Classification {
        let completion = self.build_request(request);

        match self.backend.complete(&completion) {
            Ok(raw) => parse_reply(&raw, &self.fallback),
            Err(e) => {
                tracing::warn!(error = %e, phase = %request.phase, "completion backend failed");
                Classification::unknown(self.fallback.backend_error.clone())
            }
        }
    }
}
