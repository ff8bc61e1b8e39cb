pub mod anthropic;
pub mod deepseek;
pub mod openai;

use crate::config::{ModelConfig, ModelProvider};
use crate::error::{ConfigError, LlmError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;

/// Which prompt shape a model family expects. Chat families take a system
/// message plus a structured user message; templated families take one
/// self-contained prompt with the guidelines inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    Chat,
    Templated,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, messages: &[Message], system: Option<&str>) -> Result<String, LlmError>;

    fn prompt_style(&self) -> PromptStyle {
        PromptStyle::Chat
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Invoke the model with a hard deadline. If the deadline wins the race the
/// in-flight call is dropped, never awaited, and the caller gets
/// `LlmError::Timeout`.
pub async fn chat_with_deadline(
    client: &dyn ModelClient,
    messages: &[Message],
    system: Option<&str>,
    deadline: Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(deadline, client.chat(messages, system)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout(deadline.as_secs())),
    }
}

/// Build the model client selected by `MODEL_TYPE`. Missing the matching API
/// key is a configuration error, fatal before any file is processed.
pub fn create_model_client(config: &ModelConfig) -> Result<Box<dyn ModelClient>, ConfigError> {
    match config.provider {
        ModelProvider::Anthropic => {
            let key = config.anthropic_api_key.as_ref().ok_or_else(|| {
                ConfigError::MissingRequired("ANTHROPIC_API_KEY (MODEL_TYPE=anthropic)".into())
            })?;
            Ok(Box::new(anthropic::AnthropicClient::new(
                key.expose_secret(),
            )))
        }
        ModelProvider::OpenAi => {
            let key = config.openai_api_key.as_ref().ok_or_else(|| {
                ConfigError::MissingRequired("OPENAI_API_KEY (MODEL_TYPE=openai)".into())
            })?;
            Ok(Box::new(openai::OpenAiClient::new(key.expose_secret())))
        }
        ModelProvider::DeepSeek => {
            let key = config.deepseek_api_key.as_ref().ok_or_else(|| {
                ConfigError::MissingRequired("DEEPSEEK_API_KEY (MODEL_TYPE=deepseek)".into())
            })?;
            Ok(Box::new(deepseek::DeepSeekClient::new(
                config.deepseek_endpoint.as_deref(),
                key.expose_secret(),
            )))
        }
    }
}
