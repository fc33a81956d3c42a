use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{FabricaError, Result};
use super::{ModelClient, ModelRequest};

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// OpenAI chat completions client
pub struct OpenAiClient {
    client: Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FabricaError::MissingCredential("OPENAI_API_KEY is not configured".to_string()))
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending chat completion request to: {} (model {})", url, request.model);

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FabricaError::Model(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FabricaError::Model(format!(
                "OpenAI API error {}: {}", status, error_text
            )));
        }

        let chat: ChatResponse = response.json().await
            .map_err(|e| FabricaError::Model(format!("Failed to parse response: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FabricaError::Parse("Completion contained no message content".to_string()))
    }

    fn has_credential(&self) -> bool {
        self.api_key().is_ok()
    }
}
