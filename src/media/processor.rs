use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{FabricaError, Result};
use super::{FilterSupport, MediaCommandBuilder, MediaProcessorTrait, Overlay};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    filters: OnceCell<FilterSupport>,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(config.clone());

        Self {
            config,
            command_builder,
            filters: OnceCell::new(),
        }
    }

    async fn detect_filters(&self) -> FilterSupport {
        match self.command_builder.list_filters().execute_capture().await {
            Ok(listing) => {
                let support = FilterSupport::from_filter_listing(&listing);
                debug!("Filter support: {:?}", support);
                support
            }
            Err(e) => {
                warn!("Could not list ffmpeg filters, overlays disabled: {}", e);
                FilterSupport::default()
            }
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn compose_base_video(
        &self,
        audio_path: &Path,
        overlays: &[Overlay],
        output_path: &Path,
    ) -> Result<()> {
        info!("Composing base video from {} -> {} ({} overlays)",
              audio_path.display(), output_path.display(), overlays.len());

        self.command_builder
            .compose_base_video(audio_path, overlays, output_path)
            .execute()
            .await
    }

    async fn apply_template(
        &self,
        base_video_path: &Path,
        overlays: &[Overlay],
        output_path: &Path,
    ) -> Result<()> {
        info!("Applying template to {} -> {} ({} overlays)",
              base_video_path.display(), output_path.display(), overlays.len());

        self.command_builder
            .apply_template(base_video_path, overlays, output_path)
            .execute()
            .await
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        let stdout = self.command_builder
            .probe_duration(media_path)
            .execute_capture()
            .await?;

        parse_probe_duration(&stdout).ok_or_else(|| {
            FabricaError::Media(format!(
                "Could not read duration of {}: {:?}",
                media_path.display(),
                stdout.trim()
            ))
        })
    }

    async fn filter_support(&self) -> FilterSupport {
        *self.filters.get_or_init(|| self.detect_filters()).await
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        for binary in [&self.config.binary_path, &self.config.probe_path] {
            let output = Command::new(binary)
                .arg("-version")
                .output()
                .map_err(|e| FabricaError::Media(format!("{} not found: {}", binary, e)))?;

            if !output.status.success() {
                return Err(FabricaError::Media(format!("{} version check failed", binary)));
            }
        }

        info!("Media processor is available");
        Ok(())
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute_capture().await?;
        // first line carries the version
        Ok(stdout.lines().next().unwrap_or("Unknown version").to_string())
    }
}

/// Parse ffprobe's bare `format=duration` output
pub fn parse_probe_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|duration| duration.is_finite() && *duration >= 0.0)
}
