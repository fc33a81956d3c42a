// Text-to-speech narration through an espeak-compatible command line tool

use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SpeechConfig;
use crate::error::{FabricaError, Result};
use crate::media::MediaCommand;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Write narration of `text` in `lang` to a WAV file at `output_path`
    async fn synthesize(&self, text: &str, lang: &str, output_path: &Path) -> Result<()>;

    fn check_availability(&self) -> Result<()>;
}

pub struct EspeakSynthesizer {
    config: SpeechConfig,
}

impl EspeakSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }

    fn command(&self, text: &str, lang: &str, output_path: &Path) -> MediaCommand {
        MediaCommand::new(&self.config.binary_path, format!("Speech synthesis ({})", lang))
            .arg("-v")
            .arg(self.config.voice_for(lang))
            .arg("-s")
            .arg(self.config.words_per_minute.to_string())
            .arg("-w")
            .output(output_path)
            .arg(text)
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str, output_path: &Path) -> Result<()> {
        if text.trim().is_empty() {
            return Err(FabricaError::Speech("nothing to narrate".to_string()));
        }

        info!("Synthesizing narration -> {}", output_path.display());
        self.command(text, lang, output_path)
            .execute()
            .await
            .map_err(|e| FabricaError::Speech(e.to_string()))?;

        let written = tokio::fs::metadata(output_path)
            .await
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(FabricaError::Speech(format!(
                "{} produced no audio at {}",
                self.config.binary_path,
                output_path.display()
            )));
        }

        debug!("Narration written to {}", output_path.display());
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .output()
            .map_err(|e| FabricaError::Speech(format!("{} not found: {}", self.config.binary_path, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FabricaError::Speech(format!("{} version check failed", self.config.binary_path)))
        }
    }
}

pub struct SpeechSynthesizerFactory;

impl SpeechSynthesizerFactory {
    pub fn create_synthesizer(config: SpeechConfig) -> Arc<dyn SpeechSynthesizer> {
        Arc::new(EspeakSynthesizer::new(config))
    }
}
