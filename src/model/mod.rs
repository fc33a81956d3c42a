// Language model providers
//
// One prompt in, one text completion out. Retrying and parsing are the
// caller's business:
// - OpenAi: chat completions with a bearer credential
// - Ollama: local /api/generate endpoint

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{ModelConfig, ModelProvider};
use crate::error::Result;

/// A single prompt/response exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
}

impl ModelRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature,
        }
    }
}

/// Main trait for generative text services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the prompt and return the raw completion text
    async fn complete(&self, request: &ModelRequest) -> Result<String>;

    /// Whether the client has what it needs to authenticate
    fn has_credential(&self) -> bool;
}

/// Factory for creating model clients
pub struct ModelClientFactory;

impl ModelClientFactory {
    pub fn create_client(config: ModelConfig) -> Result<Arc<dyn ModelClient>> {
        match config.provider {
            ModelProvider::OpenAi => Ok(Arc::new(openai::OpenAiClient::new(config)?)),
            ModelProvider::Ollama => Ok(Arc::new(ollama::OllamaClient::new(config)?)),
        }
    }
}

/// Strip a Markdown code fence that chat models like to wrap JSON in
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the info string ("json") on the opening line
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\nhola\n```"), "hola");
    }
}
