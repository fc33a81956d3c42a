use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FabricaError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub generation: GenerationConfig,
    pub translation: TranslationConfig,
    pub retry: RetryConfig,
    pub model: ModelConfig,
    pub speech: SpeechConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Topical category steering prompts and hashtags
    pub niche: String,
    /// Language tag of generated scripts
    pub source_language: String,
    /// Languages to translate into (the source language is ignored if listed)
    pub target_languages: Vec<String>,
    /// Number of scripts requested per batch
    pub videos_per_batch: u32,
    /// Target spoken duration hint in seconds
    pub target_duration_seconds: u32,
    /// Simulate rendering and copying without touching media files
    pub dry_run: bool,
    /// Working directory for audio, raw and templated videos
    pub media_root: PathBuf,
    /// Root under which dated batch directories are created
    pub batch_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model used to write scripts
    pub model: String,
    pub temperature: f32,
    /// Attempts per script before the index is skipped
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Model used to translate titles and bodies
    pub model: String,
    pub temperature: f32,
    /// Attempts per translate call before the pair is skipped
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Linear backoff unit: attempt N waits N times this many milliseconds
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
    /// Local Ollama server
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Base URL of the provider
    pub endpoint: String,
    /// Bearer credential for OpenAI; filled from OPENAI_API_KEY when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Wall-clock limit for a single request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Path to the TTS binary (espeak-ng compatible command line)
    pub binary_path: String,
    /// Speaking rate in words per minute
    pub words_per_minute: u32,
    /// Voice per language tag; languages not listed use the tag itself
    pub voices: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Background color of the base composition
    pub base_background: String,
    /// Canvas color of the template composition
    pub template_background: String,
    /// Width the base video is scaled to inside the template canvas
    pub template_inner_width: u32,
    /// Words per burned-in subtitle cue
    pub subtitle_words_per_chunk: usize,
    /// Watermark text drawn by the template; empty disables it
    pub watermark: String,
    /// Optional font file for drawtext overlays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,
    /// Additional encoding options appended to every render
    /// e.g. ["-preset", "medium", "-crf", "23"]
    pub encoding_options: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            niche: "psicologia".to_string(),
            source_language: "br".to_string(),
            target_languages: vec!["en".to_string(), "es".to_string()],
            videos_per_batch: 5,
            target_duration_seconds: 40,
            dry_run: false,
            media_root: PathBuf::from("media"),
            batch_root: PathBuf::from("batches"),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_attempts: 3,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_attempts: 3,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { base_delay_ms: 1500 }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let voices = [("br", "pt-br"), ("en", "en-us"), ("es", "es")]
            .into_iter()
            .map(|(lang, voice)| (lang.to_string(), voice.to_string()))
            .collect();

        Self {
            binary_path: "espeak-ng".to_string(),
            words_per_minute: 165,
            voices,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            width: 1080,
            height: 1920,
            fps: 30,
            base_background: "0x141414".to_string(),
            template_background: "0x0c0c0c".to_string(),
            template_inner_width: 960,
            subtitle_words_per_chunk: 7,
            watermark: "FabricaTiktok".to_string(),
            font_file: None,
            encoding_options: vec![
                // "-preset".to_string(), "medium".to_string(),
                // "-crf".to_string(), "23".to_string(),
            ],
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl SpeechConfig {
    pub fn voice_for(&self, lang: &str) -> String {
        self.voices
            .get(lang)
            .cloned()
            .unwrap_or_else(|| lang.to_string())
    }
}

impl PipelineConfig {
    /// Target languages in configured order, without the source language and duplicates
    pub fn translation_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for lang in &self.target_languages {
            let lang = lang.trim();
            if lang.is_empty() || lang.eq_ignore_ascii_case(&self.source_language) {
                continue;
            }
            if !targets.iter().any(|existing| existing == lang) {
                targets.push(lang.to_string());
            }
        }
        targets
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FabricaError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| FabricaError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FabricaError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FabricaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.niche.trim().is_empty() {
            return Err(FabricaError::Config("niche must not be empty".to_string()));
        }
        if self.pipeline.videos_per_batch == 0 {
            return Err(FabricaError::Config("videos_per_batch must be greater than zero".to_string()));
        }
        if self.generation.max_attempts == 0 || self.translation.max_attempts == 0 {
            return Err(FabricaError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.media.subtitle_words_per_chunk == 0 {
            return Err(FabricaError::Config("subtitle_words_per_chunk must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pipeline]
            niche = "fitness"
            target_languages = ["es"]
            dry_run = true

            [retry]
            base_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.niche, "fitness");
        assert_eq!(config.pipeline.videos_per_batch, 5);
        assert!(config.pipeline.dry_run);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.retry.base_delay(), Duration::ZERO);
        assert_eq!(config.media.width, 1080);
    }

    #[test]
    fn test_translation_targets_skip_source_and_duplicates() {
        let pipeline = PipelineConfig {
            target_languages: vec!["es".into(), "br".into(), "en".into(), "es".into(), " ".into()],
            ..PipelineConfig::default()
        };
        assert_eq!(pipeline.translation_targets(), vec!["es".to_string(), "en".to_string()]);
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.pipeline.videos_per_batch = 0;
        assert!(matches!(config.validate(), Err(FabricaError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pipeline.niche = "financas".to_string();
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.pipeline.niche, "financas");
        assert!(reloaded.model.api_key.is_none());
    }

    #[test]
    fn test_voice_fallback() {
        let speech = SpeechConfig::default();
        assert_eq!(speech.voice_for("br"), "pt-br");
        assert_eq!(speech.voice_for("fr"), "fr");
    }
}
