use crate::error::LlmError;
use crate::llm::{Message, ModelClient, PromptStyle, Role};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_ENDPOINT: &str = "https://models.inference.ai.azure.com";
const MODEL_NAME: &str = "DeepSeek-R1";
const MAX_TOKENS: u32 = 32768;
const TEMPERATURE: f32 = 0.7;

/// Raw-completion client for the DeepSeek-R1 family behind an
/// Azure-inference-style endpoint. The model emits visible deliberation in
/// `<think>` blocks and often wraps its JSON in a fenced code block; both
/// are handled downstream by the response sanitizer.
pub struct DeepSeekClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl DeepSeekClient {
    pub fn new(endpoint: Option<&str>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<CompletionMessage>,
    response_format: serde_json::Value,
}

#[derive(Serialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[async_trait]
impl ModelClient for DeepSeekClient {
    async fn chat(&self, messages: &[Message], system: Option<&str>) -> Result<String, LlmError> {
        let mut completion_messages: Vec<CompletionMessage> = Vec::new();

        if let Some(sys) = system {
            completion_messages.push(CompletionMessage {
                role: "system".to_string(),
                content: sys.to_string(),
            });
        }

        for msg in messages {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            completion_messages.push(CompletionMessage {
                role: role.to_string(),
                content: msg.content.clone(),
            });
        }

        let request = CompletionRequest {
            model: MODEL_NAME.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: completion_messages,
            response_format: json!({"type": "json_object"}),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited {
                retry_after_ms: 60000,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::InvalidResponse(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Invalid response: {}", e)))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }

    fn prompt_style(&self) -> PromptStyle {
        PromptStyle::Templated
    }
}
