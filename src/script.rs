use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::config::{GenerationConfig, RetryConfig};
use crate::error::{FabricaError, Result};
use crate::model::{strip_code_fence, ModelClient, ModelRequest};
use crate::record::{script_id, ScriptRecord, SkippedItem, StageOutput};
use crate::retry::{classify, retry_with_backoff, RetryError, RetryPolicy};

/// What to generate for one batch
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub niche: String,
    pub count: u32,
    pub target_duration_seconds: u32,
    pub source_language: String,
    pub date: NaiveDate,
}

/// Fields extracted from a generation response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    pub title: String,
    pub body: String,
    pub duration_seconds: u32,
}

pub fn build_generation_prompt(niche: &str, target_duration_seconds: u32) -> String {
    format!(
        "Você é um roteirista de vídeos curtos. Gere um roteiro em PT-BR para um \
         vídeo de aproximadamente {} segundos no nicho '{}'. \
         Retorne apenas um JSON com as chaves: titulo, script, duracao_target. \
         O script deve estar em formato de fala para avatar, com tom direto e envolvente.",
        target_duration_seconds, niche
    )
}

/// Parse a generation response.
///
/// Accepts `titulo`/`title`, `script`/`body` and an optional
/// `duracao_target`/`duration` given as a number or numeric string.
/// Anything else is a retryable [`FabricaError::Parse`].
pub fn parse_script_response(raw: &str, default_duration: u32) -> Result<ParsedScript> {
    let payload: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| FabricaError::Parse(format!("response is not valid JSON: {}", e)))?;

    let object = payload
        .as_object()
        .ok_or_else(|| FabricaError::Parse("response JSON is not an object".to_string()))?;

    let text_field = |keys: [&str; 2]| -> Result<String> {
        let value = keys.iter().find_map(|key| object.get(*key));
        match value {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Some(Value::String(_)) => Err(FabricaError::Parse(format!("'{}' is empty", keys[0]))),
            Some(_) => Err(FabricaError::Parse(format!("'{}' is not a string", keys[0]))),
            None => Err(FabricaError::Parse(format!("missing key '{}'", keys[0]))),
        }
    };

    let title = text_field(["titulo", "title"])?;
    let body = text_field(["script", "body"])?;

    let duration_seconds = match ["duracao_target", "duration"].iter().find_map(|key| object.get(*key)) {
        None | Some(Value::Null) => default_duration,
        Some(value) => coerce_duration(value)?,
    };

    Ok(ParsedScript {
        title,
        body,
        duration_seconds,
    })
}

fn coerce_duration(value: &Value) -> Result<u32> {
    let invalid = || FabricaError::Parse(format!("duration '{}' is not a whole number of seconds", value));

    match value {
        Value::Number(number) => {
            if let Some(seconds) = number.as_u64() {
                return u32::try_from(seconds).map_err(|_| invalid());
            }
            match number.as_f64() {
                Some(seconds) if seconds.is_finite() && seconds >= 0.0 && seconds <= u32::MAX as f64 => {
                    Ok(seconds.trunc() as u32)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(text) => text.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Writes source-language scripts with bounded retries per index
pub struct ScriptGenerator {
    client: Arc<dyn ModelClient>,
    config: GenerationConfig,
    policy: RetryPolicy,
}

impl ScriptGenerator {
    pub fn new(client: Arc<dyn ModelClient>, config: GenerationConfig, retry: &RetryConfig) -> Self {
        let policy = RetryPolicy::new(config.max_attempts, retry.base_delay());
        Self {
            client,
            config,
            policy,
        }
    }

    /// Produce up to `request.count` records.
    ///
    /// An index whose attempts are exhausted contributes no record and is
    /// listed in [`StageOutput::skipped`]. A fatal error (missing credential)
    /// aborts generation.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<StageOutput> {
        info!("Generating {} scripts for niche '{}' with {}",
              request.count, request.niche, self.config.model);

        let prompt = build_generation_prompt(&request.niche, request.target_duration_seconds);
        let model_request = &ModelRequest::new(prompt, &self.config.model, self.config.temperature);
        let default_duration = request.target_duration_seconds;
        let mut output = StageOutput::default();

        for index in 1..=request.count {
            let id = script_id(&request.niche, request.date, index);
            let label = format!("script {}", id);

            let attempt = retry_with_backoff(&self.policy, &label, classify, |_| async move {
                let raw = self.client.complete(model_request).await?;
                parse_script_response(&raw, default_duration)
            })
            .await;

            match attempt {
                Ok(parsed) => {
                    info!("Script {}/{} ready: {} ({})", index, request.count, id, parsed.title);
                    output.records.push(ScriptRecord::new(
                        id,
                        request.source_language.clone(),
                        parsed.title,
                        parsed.body,
                        parsed.duration_seconds,
                        request.niche.clone(),
                    ));
                }
                Err(RetryError::Exhausted { last_error, attempts, .. }) => {
                    warn!("Failed to generate script {} after {} attempts: {}", id, attempts, last_error);
                    output.skipped.push(SkippedItem {
                        id,
                        reason: last_error.to_string(),
                    });
                }
                Err(RetryError::Fatal(error)) => return Err(error),
            }
        }

        Ok(output)
    }
}

/// Save generated scripts for human review
pub async fn save_scripts<P: AsRef<Path>>(records: &[ScriptRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(records)?;
    fs::write(path, content).await?;

    info!("Saved {} scripts for review: {}", records.len(), path.display());
    Ok(())
}

/// Load reviewed scripts; only the script fields are kept
pub async fn load_scripts<P: AsRef<Path>>(path: P) -> Result<Vec<ScriptRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FabricaError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await?;
    let records: Vec<ScriptRecord> = serde_json::from_str(&content)
        .map_err(|e| FabricaError::Config(format!("Invalid scripts file {}: {}", path.display(), e)))?;

    Ok(records
        .into_iter()
        .map(|record| {
            ScriptRecord::new(
                record.id,
                record.lang,
                record.title,
                record.body,
                record.target_duration_seconds,
                record.niche,
            )
        })
        .collect())
}
