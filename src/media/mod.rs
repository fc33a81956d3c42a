// Video composition on top of ffmpeg
//
// - Commands: argument building for every ffmpeg/ffprobe invocation
// - Overlay: optional title, watermark and subtitle layers
// - Processor: the ffmpeg-backed implementation of the trait below

pub mod commands;
pub mod overlay;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub use commands::*;
pub use overlay::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Render the narration over a solid vertical background
    async fn compose_base_video(
        &self,
        audio_path: &Path,
        overlays: &[Overlay],
        output_path: &Path,
    ) -> Result<()>;

    /// Place a base video on the branded canvas
    async fn apply_template(
        &self,
        base_video_path: &Path,
        overlays: &[Overlay],
        output_path: &Path,
    ) -> Result<()>;

    /// Duration of a media file in seconds
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Optional filters available in this ffmpeg build
    async fn filter_support(&self) -> FilterSupport;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Arc<dyn MediaProcessorTrait> {
        Arc::new(processor::MediaProcessorImpl::new(config))
    }
}
