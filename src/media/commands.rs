use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{FabricaError, Result};
use super::Overlay;

/// Abstract external command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add a lavfi virtual input such as a solid color source
    pub fn lavfi_input<S: Into<String>>(self, source: S) -> Self {
        self.arg("-f").arg("lavfi").arg("-i").arg(source)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Pixel format most players accept
    pub fn compatible_pixels(self) -> Self {
        self.arg("-pix_fmt").arg("yuv420p")
    }

    /// Set output frame rate
    pub fn frame_rate(self, fps: u32) -> Self {
        self.arg("-r").arg(fps.to_string())
    }

    /// Stop at the end of the shortest input
    pub fn shortest(self) -> Self {
        self.arg("-shortest")
    }

    /// Add a video filter chain, skipped when empty
    pub fn video_filters(self, filters: &[String]) -> Self {
        if filters.is_empty() {
            self
        } else {
            self.arg("-vf").arg(filters.join(","))
        }
    }

    async fn run(&self) -> Result<std::process::Output> {
        debug!("Executing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| FabricaError::Media(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FabricaError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(output)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }

    /// Execute the command and return its standard output
    pub async fn execute_capture(&self) -> Result<String> {
        let output = self.run().await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for the commands the render stages need
pub struct MediaCommandBuilder {
    config: MediaConfig,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Solid background + narration audio, with optional overlays
    pub fn compose_base_video<P: AsRef<Path>>(
        &self,
        audio_path: P,
        overlays: &[Overlay],
        output_path: P,
    ) -> MediaCommand {
        let background = format!(
            "color=c={}:s={}x{}:r={}",
            self.config.base_background, self.config.width, self.config.height, self.config.fps
        );
        let filters: Vec<String> = overlays.iter().map(Overlay::to_filter).collect();

        MediaCommand::new(&self.config.binary_path, "Base video composition")
            .overwrite()
            .lavfi_input(background)
            .input(audio_path)
            .video_filters(&filters)
            .video_codec("libx264")
            .compatible_pixels()
            .audio_codec("aac")
            .shortest()
            .args(self.config.encoding_options.iter().cloned())
            .output(output_path)
    }

    /// Base video scaled onto the vertical canvas, with optional overlays
    pub fn apply_template<P: AsRef<Path>>(
        &self,
        base_video_path: P,
        overlays: &[Overlay],
        output_path: P,
    ) -> MediaCommand {
        let mut filters = vec![
            format!("scale={}:-2", self.config.template_inner_width),
            format!(
                "pad={}:{}:(ow-iw)/2:(oh-ih)/2:color={}",
                self.config.width, self.config.height, self.config.template_background
            ),
        ];
        filters.extend(overlays.iter().map(Overlay::to_filter));

        MediaCommand::new(&self.config.binary_path, "Template application")
            .overwrite()
            .input(base_video_path)
            .video_filters(&filters)
            .frame_rate(self.config.fps)
            .video_codec("libx264")
            .compatible_pixels()
            .copy_audio()
            .args(self.config.encoding_options.iter().cloned())
            .output(output_path)
    }

    /// Build duration probe command
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.config.probe_path, "Duration probe")
            .arg("-v").arg("error")
            .arg("-show_entries").arg("format=duration")
            .arg("-of").arg("default=noprint_wrappers=1:nokey=1")
            .output(media_path)
    }

    /// Build filter listing command
    pub fn list_filters(&self) -> MediaCommand {
        MediaCommand::new(&self.config.binary_path, "Filter listing")
            .arg("-hide_banner")
            .arg("-filters")
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.config.binary_path, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new(MediaConfig::default())
    }

    #[test]
    fn test_base_video_without_overlays() {
        let cmd = builder().compose_base_video(
            Path::new("media/audio/a_br.wav"),
            &[],
            Path::new("media/raw_videos/a_br.mp4"),
        );

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(cmd.args[..5], ["-y", "-f", "lavfi", "-i", "color=c=0x141414:s=1080x1920:r=30"]);
        assert!(!cmd.args.contains(&"-vf".to_string()));
        assert!(cmd.args.contains(&"-shortest".to_string()));
        assert_eq!(cmd.args.last().map(String::as_str), Some("media/raw_videos/a_br.mp4"));
    }

    #[test]
    fn test_template_appends_overlays_after_canvas() {
        let overlays = vec![Overlay::Subtitles {
            srt_file: PathBuf::from("media/subtitles/a_br.srt"),
        }];
        let cmd = builder().apply_template(
            Path::new("media/raw_videos/a_br.mp4"),
            &overlays,
            Path::new("media/final_videos/a_br.mp4"),
        );

        let vf_index = cmd.args.iter().position(|a| a == "-vf").unwrap();
        let chain = &cmd.args[vf_index + 1];
        assert!(chain.starts_with("scale=960:-2,pad=1080:1920:(ow-iw)/2:(oh-ih)/2:color=0x0c0c0c,subtitles="));
        assert!(cmd.args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "copy"));
    }

    #[test]
    fn test_probe_command() {
        let cmd = builder().probe_duration(Path::new("x.mp4"));
        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(cmd.args.last().map(String::as_str), Some("x.mp4"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_error() {
        let result = MediaCommand::new("/nonexistent/fabrica-ffmpeg", "Probe")
            .arg("-version")
            .execute()
            .await;
        assert!(matches!(result, Err(FabricaError::Media(_))));
    }
}
