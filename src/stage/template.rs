use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::{FabricaError, Result};
use crate::media::{plan_subtitles, plan_watermark, MediaProcessorTrait, Overlay};
use crate::record::{RenderStage, ScriptRecord};
use crate::subtitle::{build_caption, write_srt};
use super::{ensure_parent, RenderStep};

/// Branded vertical canvas with burned-in subtitles and watermark
pub struct TemplateStep {
    media: Arc<dyn MediaProcessorTrait>,
    config: MediaConfig,
    media_root: PathBuf,
}

impl TemplateStep {
    pub fn new(media: Arc<dyn MediaProcessorTrait>, config: MediaConfig, media_root: impl Into<PathBuf>) -> Self {
        Self {
            media,
            config,
            media_root: media_root.into(),
        }
    }

    fn subtitle_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("subtitles")
            .join(format!("{}.srt", record.file_stem()))
    }

    fn watermark_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("overlays")
            .join(format!("{}_watermark.txt", record.file_stem()))
    }

    /// Subtitle timing follows the real base video, else the requested length
    async fn subtitle_duration(&self, record: &ScriptRecord, base_video: &Path) -> f64 {
        match self.media.probe_duration(base_video).await {
            Ok(duration) => duration,
            Err(e) => {
                warn!("{}: using target duration for subtitles: {}", record.file_stem(), e);
                f64::from(record.target_duration_seconds)
            }
        }
    }
}

#[async_trait]
impl RenderStep for TemplateStep {
    fn stage(&self) -> RenderStage {
        RenderStage::Template
    }

    fn output_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("final_videos")
            .join(format!("{}.mp4", record.file_stem()))
    }

    async fn render(&self, record: &ScriptRecord, output_path: &Path) -> Result<()> {
        let base_video = record.base_video_path.as_deref().ok_or_else(|| {
            FabricaError::Media(format!("{} has no base video", record.file_stem()))
        })?;
        if !base_video.exists() {
            return Err(FabricaError::FileNotFound(base_video.display().to_string()));
        }
        ensure_parent(output_path).await?;

        let support = self.media.filter_support().await;
        let mut overlays = Vec::new();

        let duration = self.subtitle_duration(record, base_video).await;
        if let Some(cues) = plan_subtitles(support, &record.body, duration, &self.config) {
            let srt_file = self.subtitle_path(record);
            ensure_parent(&srt_file).await?;
            write_srt(&cues, &srt_file).await?;
            overlays.push(Overlay::Subtitles { srt_file });
        } else {
            debug!("{}: subtitles omitted", record.file_stem());
        }

        if let Some(watermark) = plan_watermark(support, &self.config) {
            let text_file = self.watermark_path(record);
            ensure_parent(&text_file).await?;
            tokio::fs::write(&text_file, &watermark.text).await?;
            overlays.push(watermark.into_overlay(text_file, self.config.font_file.clone()));
        } else {
            debug!("{}: watermark omitted", record.file_stem());
        }

        self.media.apply_template(base_video, &overlays, output_path).await
    }

    fn complete(&self, record: ScriptRecord, output_path: PathBuf) -> ScriptRecord {
        let caption = build_caption(&record.title, &record.niche);
        record
            .with_output(RenderStage::Template, output_path)
            .with_caption(caption)
    }
}
