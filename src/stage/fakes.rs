// In-memory collaborators for render step tests

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{FabricaError, Result};
use crate::media::{FilterSupport, MediaProcessorTrait, Overlay};
use crate::speech::SpeechSynthesizer;

/// Writes a stub WAV; fails for text containing `fail_on`
#[derive(Default)]
pub struct FakeSpeech {
    pub fail_on: Option<String>,
    pub calls: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, lang: &str, output_path: &Path) -> Result<()> {
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(FabricaError::Speech("voice not installed".to_string()));
            }
        }
        tokio::fs::write(output_path, b"RIFF").await?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((lang.to_string(), output_path.to_path_buf()));
        }
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub input: PathBuf,
    pub overlays: Vec<Overlay>,
    pub output: PathBuf,
}

/// Writes stub videos and remembers every render call
pub struct FakeMedia {
    pub support: FilterSupport,
    pub duration: Option<f64>,
    pub fail_on: Option<String>,
    pub base_calls: Mutex<Vec<RenderCall>>,
    pub template_calls: Mutex<Vec<RenderCall>>,
}

impl FakeMedia {
    pub fn new(support: FilterSupport) -> Self {
        Self {
            support,
            duration: Some(4.0),
            fail_on: None,
            base_calls: Mutex::new(Vec::new()),
            template_calls: Mutex::new(Vec::new()),
        }
    }

    async fn fake_render(&self, calls: &Mutex<Vec<RenderCall>>, input: &Path, overlays: &[Overlay], output: &Path) -> Result<()> {
        if let Some(marker) = &self.fail_on {
            if output.to_string_lossy().contains(marker.as_str()) {
                return Err(FabricaError::Media("ffmpeg exited with status 1".to_string()));
            }
        }
        tokio::fs::write(output, b"mp4").await?;
        if let Ok(mut calls) = calls.lock() {
            calls.push(RenderCall {
                input: input.to_path_buf(),
                overlays: overlays.to_vec(),
                output: output.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaProcessorTrait for FakeMedia {
    async fn compose_base_video(&self, audio_path: &Path, overlays: &[Overlay], output_path: &Path) -> Result<()> {
        self.fake_render(&self.base_calls, audio_path, overlays, output_path).await
    }

    async fn apply_template(&self, base_video_path: &Path, overlays: &[Overlay], output_path: &Path) -> Result<()> {
        self.fake_render(&self.template_calls, base_video_path, overlays, output_path).await
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        self.duration
            .ok_or_else(|| FabricaError::Media(format!("cannot probe {}", media_path.display())))
    }

    async fn filter_support(&self) -> FilterSupport {
        self.support
    }

    fn check_availability(&self) -> Result<()> {
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        Ok("ffmpeg version fake".to_string())
    }
}
