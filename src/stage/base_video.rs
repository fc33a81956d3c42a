use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::media::{plan_title, MediaProcessorTrait};
use crate::record::{RenderStage, ScriptRecord};
use crate::speech::SpeechSynthesizer;
use super::{ensure_parent, RenderStep};

/// Narration plus solid background, with the title drawn when supported
pub struct BaseVideoStep {
    speech: Arc<dyn SpeechSynthesizer>,
    media: Arc<dyn MediaProcessorTrait>,
    config: MediaConfig,
    media_root: PathBuf,
}

impl BaseVideoStep {
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaProcessorTrait>,
        config: MediaConfig,
        media_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            speech,
            media,
            config,
            media_root: media_root.into(),
        }
    }

    pub fn audio_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("audio")
            .join(format!("{}.wav", record.file_stem()))
    }

    fn title_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("overlays")
            .join(format!("{}_title.txt", record.file_stem()))
    }
}

#[async_trait]
impl RenderStep for BaseVideoStep {
    fn stage(&self) -> RenderStage {
        RenderStage::BaseVideo
    }

    fn output_path(&self, record: &ScriptRecord) -> PathBuf {
        self.media_root
            .join("raw_videos")
            .join(format!("{}.mp4", record.file_stem()))
    }

    async fn render(&self, record: &ScriptRecord, output_path: &Path) -> Result<()> {
        let audio_path = self.audio_path(record);
        ensure_parent(&audio_path).await?;
        ensure_parent(output_path).await?;

        self.speech.synthesize(&record.body, &record.lang, &audio_path).await?;

        let mut overlays = Vec::new();
        let support = self.media.filter_support().await;
        if let Some(title) = plan_title(support, &record.title, &self.config) {
            let text_file = self.title_path(record);
            ensure_parent(&text_file).await?;
            tokio::fs::write(&text_file, &title.text).await?;
            overlays.push(title.into_overlay(text_file, self.config.font_file.clone()));
        } else {
            debug!("{}: title overlay omitted", record.file_stem());
        }

        self.media
            .compose_base_video(&audio_path, &overlays, output_path)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FilterSupport, Overlay};
    use crate::stage::fakes::{FakeMedia, FakeSpeech};
    use crate::stage::StageRunner;

    fn record(n: u32, title: &str) -> ScriptRecord {
        ScriptRecord::new(format!("fitness_20261019_{:03}", n), "br", title, format!("corpo {}", n), 40, "fitness")
    }

    #[tokio::test]
    async fn test_renders_audio_then_video() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(FakeSpeech::default());
        let media = Arc::new(FakeMedia::new(FilterSupport::all()));
        let step = BaseVideoStep::new(speech.clone(), media.clone(), MediaConfig::default(), dir.path());

        let output = StageRunner::new(step).run(vec![record(1, "Treino rapido")], false).await;

        let raw = dir.path().join("raw_videos/fitness_20261019_001_br.mp4");
        let audio = dir.path().join("audio/fitness_20261019_001_br.wav");
        assert!(output[0].is_ok());
        assert_eq!(output[0].base_video_path.as_ref(), Some(&raw));
        assert!(raw.exists() && audio.exists());

        let calls = media.base_calls.lock().unwrap();
        assert_eq!(calls[0].input, audio);
        let title_file = dir.path().join("overlays/fitness_20261019_001_br_title.txt");
        assert!(matches!(&calls[0].overlays[..], [Overlay::Text { text_file, .. }] if *text_file == title_file));
        assert_eq!(std::fs::read_to_string(title_file).unwrap(), "Treino rapido");
    }

    #[tokio::test]
    async fn test_title_omitted_without_drawtext() {
        let dir = tempfile::tempdir().unwrap();
        let media = Arc::new(FakeMedia::new(FilterSupport::default()));
        let step = BaseVideoStep::new(Arc::new(FakeSpeech::default()), media.clone(), MediaConfig::default(), dir.path());

        let output = StageRunner::new(step).run(vec![record(1, "Treino rapido")], false).await;

        assert!(output[0].is_ok());
        assert!(media.base_calls.lock().unwrap()[0].overlays.is_empty());
        assert!(!dir.path().join("overlays").exists());
    }

    #[tokio::test]
    async fn test_speech_failure_marks_only_that_record() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(FakeSpeech {
            fail_on: Some("corpo 2".to_string()),
            ..FakeSpeech::default()
        });
        let media = Arc::new(FakeMedia::new(FilterSupport::all()));
        let step = BaseVideoStep::new(speech, media.clone(), MediaConfig::default(), dir.path());

        let records = vec![record(1, "A"), record(2, "B"), record(3, "C")];
        let output = StageRunner::new(step).run(records, false).await;

        assert!(output[0].is_ok() && output[2].is_ok());
        assert!(output[1].is_failed());
        assert!(output[1].error().unwrap().contains("voice not installed"));
        assert_eq!(media.base_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("media");
        let speech = Arc::new(FakeSpeech::default());
        let media = Arc::new(FakeMedia::new(FilterSupport::all()));
        let step = BaseVideoStep::new(speech.clone(), media.clone(), MediaConfig::default(), &root);

        let output = StageRunner::new(step).run(vec![record(1, "A"), record(2, "B")], true).await;

        assert!(output.iter().all(ScriptRecord::is_ok));
        assert_eq!(output[1].base_video_path, Some(root.join("raw_videos/fitness_20261019_002_br.mp4")));
        assert!(!root.exists());
        assert!(speech.calls.lock().unwrap().is_empty());
        assert!(media.base_calls.lock().unwrap().is_empty());
    }
}
