//! DeepSeek backend, spoken over the OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, CompletionRequest, GenerationBackend, LlmError, Message};

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct DeepSeekBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl DeepSeekBackend {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Decodes a chat-completions body. A missing `choices` array decodes as empty.
fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl GenerationBackend for DeepSeekBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: request.messages,
            stream: false,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
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

        let completion = parse_completion(&text)?;
        if let Some(first) = completion.choices.first() {
            debug!(
                "DeepSeek call succeeded: id={}, choices={}, choice {} finish_reason={:?}",
                completion.id,
                completion.choices.len(),
                first.index,
                first.finish_reason
            );
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{Role, Usage};

    #[test]
    fn test_parse_chat_completion_body() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1717000000,
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "```json\n{\"recommendations\": []}\n```"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
        }"#;

        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.model, "deepseek-chat");
        assert_eq!(completion.choices[0].message.role, Role::Assistant);
        assert_eq!(completion.text(), Some("```json\n{\"recommendations\": []}\n```"));
        assert_eq!(
            completion.usage,
            Some(Usage {
                prompt_tokens: 120,
                completion_tokens: 30,
                total_tokens: 150
            })
        );
    }

    #[test]
    fn test_null_content_decodes_as_empty_text() {
        let body = r#"{
            "id": "chatcmpl-2",
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null},
                "finish_reason": "length"
            }]
        }"#;

        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.text(), Some(""));
        assert_eq!(completion.choices[0].index, 0);
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("length"));
    }

    #[test]
    fn test_missing_choices_decode_as_empty() {
        let completion = parse_completion(r#"{"id": "x", "model": "deepseek-chat"}"#).unwrap();
        assert!(completion.choices.is_empty());
        assert!(completion.usage.is_none());
    }

    #[test]
    fn test_request_serializes_lowercase_roles() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            stream: false,
            max_tokens: 720,
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["stream"], false);
        assert_eq!(json["max_tokens"], 720);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let backend = DeepSeekBackend::new(
            Client::new(),
            "https://api.deepseek.com/",
            "key".into(),
            DEFAULT_MODEL.into(),
        );
        assert_eq!(backend.endpoint(), "https://api.deepseek.com/chat/completions");
    }
}
