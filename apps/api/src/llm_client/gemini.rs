//! Google Gemini backend (`generateContent`).
//!
//! Gemini has no system role in `contents`; system messages go into
//! `systemInstruction` and assistant turns are sent as role `model`.
//! Answers are folded into the shared `Completion` shape.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Choice, Completion, CompletionRequest, GenerationBackend, LlmError, Message, Role, Usage};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(String::from),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

fn build_request(request: &CompletionRequest<'_>) -> GenerateContentRequest {
    let system: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents = request
        .messages
        .iter()
        .filter_map(|m| match m.role {
            Role::System => None,
            Role::User => Some(text_content(Some("user"), &m.content)),
            Role::Assistant => Some(text_content(Some("model"), &m.content)),
        })
        .collect();

    GenerateContentRequest {
        system_instruction: (!system.is_empty()).then(|| text_content(None, &system.join("\n"))),
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    }
}

/// Candidates without any text are dropped, so an all-blocked answer has no choices.
fn into_completion(response: GenerateContentResponse, model: &str) -> Completion {
    let choices = response
        .candidates
        .into_iter()
        .filter_map(|candidate| {
            let text: String = candidate
                .content?
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect();
            Some((text, candidate.finish_reason))
        })
        .filter(|(text, _)| !text.trim().is_empty())
        .enumerate()
        .map(|(index, (text, finish_reason))| Choice {
            index: index as u32,
            message: Message::assistant(text),
            finish_reason,
        })
        .collect();

    let usage = response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Completion {
        id: response.response_id.unwrap_or_default(),
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        choices,
        usage,
    }
}

#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_URL}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        let body = build_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        let completion = into_completion(parsed, &self.model);
        debug!(
            "Gemini call succeeded: model={}, choices={}",
            completion.model,
            completion.choices.len()
        );
        Ok(completion)
    }
}
