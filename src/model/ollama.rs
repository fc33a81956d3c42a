use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{FabricaError, Result};
use super::{ModelClient, ModelRequest};

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local Ollama client; needs no credential
pub struct OllamaClient {
    client: Client,
    config: ModelConfig,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Check if Ollama is reachable and the model is pulled
    pub async fn check_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/show", self.config.endpoint.trim_end_matches('/'));

        let response = self.client
            .post(&url)
            .json(&json!({ "name": model }))
            .send()
            .await
            .map_err(|e| FabricaError::Model(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", model);
            Ok(())
        } else {
            Err(FabricaError::Config(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                model, model
            )))
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending generate request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FabricaError::Model(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FabricaError::Model(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| FabricaError::Model(format!("Failed to parse response: {}", e)))?;

        debug!("Raw Ollama response: {}", generated.response);
        Ok(generated.response)
    }

    fn has_credential(&self) -> bool {
        true
    }
}
