/// LLM Client — the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may talk to a provider API directly.
/// Providers plug in behind `GenerationBackend`; callers only ever see
/// `GenerationClient`, which owns token accounting for every call.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod deepseek;
pub mod gemini;
pub mod json_block;
pub mod prompts;
pub mod tokens;
pub mod usage_log;

use tokens::TokenEstimator;

/// Output budget for recommendation calls.
pub const DEFAULT_MAX_TOKENS: u32 = 720;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Timeout applied by every HTTP backend.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("error: no answer from AI LLM")]
    EmptyGenerationResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider-neutral types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Providers send `null` content for truncated or refused answers.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token counts as reported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A provider answer normalised to the chat-completion shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl Completion {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    Estimation,
    BackendReported,
    Error,
    NotSet,
}

/// Per-call token accounting. Never shared between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub is_estimated: bool,
    pub source: UsageSource,
    /// Plugin that issued the call, attached after generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
}

impl Default for TokenUsage {
    fn default() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            is_estimated: true,
            source: UsageSource::NotSet,
            extractor: None,
        }
    }
}

impl TokenUsage {
    pub fn estimated(prompt_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens: prompt_tokens,
            source: UsageSource::Estimation,
            ..Self::default()
        }
    }

    /// Zeroed record for a call whose backend failed.
    pub fn failed() -> Self {
        Self {
            is_estimated: false,
            source: UsageSource::Error,
            ..Self::default()
        }
    }

    fn reconcile(&mut self, reported: &Usage) {
        if reported.total_tokens == 0 {
            return;
        }
        self.prompt_tokens = reported.prompt_tokens;
        self.completion_tokens = reported.completion_tokens;
        self.total_tokens = reported.total_tokens;
        self.is_estimated = false;
        self.source = UsageSource::BackendReported;
    }

    pub fn with_extractor(mut self, name: &str) -> Self {
        self.extractor = Some(name.to_string());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend seam
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One provider API. Implementations make exactly one network round trip.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Model name, also used to pick the token estimator.
    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Result of one generation call. `None` means the backend could not be reached.
pub type Generation = (Option<Completion>, TokenUsage);

/// Wraps a backend with prompt-token estimation and usage reconciliation.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    estimator: TokenEstimator,
    options: GenerationOptions,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let estimator = TokenEstimator::for_model(backend.model());
        Self {
            backend,
            estimator,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Generates with this client's default options.
    pub async fn generate(&self, messages: &[Message]) -> Result<Generation, LlmError> {
        self.generate_with(messages, self.options).await
    }

    /// Single attempt, no retries.
    ///
    /// Transport and provider failures degrade to `(None, TokenUsage::failed())`.
    /// An answer without choices, or whose first choice has no text, is the
    /// only error returned.
    pub async fn generate_with(
        &self,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<Generation, LlmError> {
        let prompt: String = messages.iter().map(|m| m.content.as_str()).collect();
        let estimate = u32::try_from(self.estimator.estimate(&prompt)).unwrap_or(u32::MAX);
        let mut usage = TokenUsage::estimated(estimate);

        let request = CompletionRequest {
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let completion = match self.backend.complete(request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!("Generation with {} failed: {e}", self.backend.model());
                return Ok((None, TokenUsage::failed()));
            }
        };

        let answered = completion.text().is_some_and(|text| !text.trim().is_empty());
        if !answered {
            return Err(LlmError::EmptyGenerationResult);
        }

        match &completion.usage {
            Some(reported) => {
                debug!(
                    "Backend usage: prompt_tokens={}, completion_tokens={}, total_tokens={}",
                    reported.prompt_tokens, reported.completion_tokens, reported.total_tokens
                );
                usage.reconcile(reported);
            }
            None => debug!("Backend reported no usage; keeping estimate of {estimate} tokens"),
        }

        Ok((Some(completion), usage))
    }
}
