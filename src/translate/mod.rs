// Script translation
//
// Every (source script, target language) pair costs two model calls, one for
// the title and one for the body, each under the shared retry policy.

pub mod language;

use std::sync::Arc;
use tracing::{info, warn};

pub use language::*;
use crate::config::{RetryConfig, TranslationConfig};
use crate::error::{FabricaError, Result};
use crate::model::{strip_code_fence, ModelClient, ModelRequest};
use crate::record::{translated_id, ScriptRecord, SkippedItem, StageOutput};
use crate::retry::{classify, retry_with_backoff, RetryError, RetryPolicy};

pub struct Translator {
    client: Arc<dyn ModelClient>,
    config: TranslationConfig,
    policy: RetryPolicy,
}

impl Translator {
    pub fn new(client: Arc<dyn ModelClient>, config: TranslationConfig, retry: &RetryConfig) -> Self {
        let policy = RetryPolicy::new(config.max_attempts, retry.base_delay());
        Self {
            client,
            config,
            policy,
        }
    }

    /// Translate one piece of text with bounded retries
    async fn translate_text(
        &self,
        text: &str,
        source: &str,
        target: &str,
        label: &str,
    ) -> std::result::Result<String, RetryError> {
        let request = &ModelRequest::new(
            build_translation_prompt(text, source, target),
            &self.config.model,
            self.config.temperature,
        );

        retry_with_backoff(&self.policy, label, classify, |_| async move {
            let raw = self.client.complete(request).await?;
            let translated = strip_code_fence(&raw).trim().to_string();
            if translated.is_empty() {
                return Err(FabricaError::Parse("empty translation received".to_string()));
            }
            Ok(translated)
        })
        .await
    }

    async fn translate_record(
        &self,
        record: &ScriptRecord,
        target: &str,
    ) -> std::result::Result<ScriptRecord, RetryError> {
        let id = translated_id(&record.id, target);
        let title = self
            .translate_text(&record.title, &record.lang, target, &format!("translate title {}", id))
            .await?;
        let body = self
            .translate_text(&record.body, &record.lang, target, &format!("translate body {}", id))
            .await?;

        Ok(record.translated(target, title, body))
    }

    /// Return the sources followed by one translated record per successful pair.
    ///
    /// Sources are passed through untouched. Targets equal to a record's own
    /// language are ignored. A pair whose retries run out is listed in
    /// [`StageOutput::skipped`]; a fatal error aborts translation.
    pub async fn translate(&self, sources: Vec<ScriptRecord>, targets: &[String]) -> Result<StageOutput> {
        info!("Translating {} scripts into {:?} with {}", sources.len(), targets, self.config.model);

        let mut translated = Vec::new();
        let mut skipped = Vec::new();

        for record in &sources {
            for target in targets {
                if target.eq_ignore_ascii_case(&record.lang) {
                    continue;
                }

                match self.translate_record(record, target).await {
                    Ok(new_record) => {
                        info!("Translated {} -> {}", record.id, new_record.id);
                        translated.push(new_record);
                    }
                    Err(RetryError::Exhausted { label, attempts, last_error }) => {
                        let id = translated_id(&record.id, target);
                        warn!("Failed to translate {} ({} gave up after {} attempts): {}",
                              id, label, attempts, last_error);
                        skipped.push(SkippedItem {
                            id,
                            reason: last_error.to_string(),
                        });
                    }
                    Err(RetryError::Fatal(error)) => return Err(error),
                }
            }
        }

        let mut records = sources;
        records.extend(translated);

        Ok(StageOutput { records, skipped })
    }
}
