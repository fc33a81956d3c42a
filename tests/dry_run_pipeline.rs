use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fabrica::batch::BatchManifest;
use fabrica::config::{Config, RetryConfig};
use fabrica::error::Result;
use fabrica::media::MediaProcessorFactory;
use fabrica::model::{ModelClient, ModelRequest};
use fabrica::speech::SpeechSynthesizerFactory;
use fabrica::workflow::{RunOptions, Workflow};

/// Answers generation prompts with a fixed script and echoes translations
struct ScriptedModel {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if request.prompt.starts_with("Traduza") {
            let text = request.prompt.rsplit("Texto:\n").next().unwrap_or_default();
            Ok(format!("(es) {}", text))
        } else {
            Ok(format!(
                "```json\n{{\"titulo\": \"Treino {}\", \"script\": \"Aquecimento e alongamento\", \"duracao_target\": 40}}\n```",
                call
            ))
        }
    }

    fn has_credential(&self) -> bool {
        true
    }
}

fn dry_run_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.pipeline.niche = "fitness".to_string();
    config.pipeline.videos_per_batch = 2;
    config.pipeline.target_languages = vec!["es".to_string()];
    config.pipeline.dry_run = true;
    config.pipeline.media_root = root.join("media");
    config.pipeline.batch_root = root.join("batches");
    config.retry = RetryConfig { base_delay_ms: 0 };
    // never reached in a dry run
    config.media.binary_path = "/nonexistent/ffmpeg".to_string();
    config.speech.binary_path = "/nonexistent/espeak-ng".to_string();
    config
}

#[tokio::test]
async fn test_fitness_dry_run_batch() {
    let temp = tempfile::tempdir().unwrap();
    let config = dry_run_config(temp.path());

    let workflow = Workflow::with_collaborators(
        config.clone(),
        Arc::new(ScriptedModel { calls: AtomicUsize::new(0) }),
        SpeechSynthesizerFactory::create_synthesizer(config.speech.clone()),
        MediaProcessorFactory::create_processor(config.media.clone()),
    );
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let report = workflow
        .run(RunOptions { scripts_file: None, date })
        .await
        .unwrap();

    // 2 source + 2 translated, all ok through both render stages
    let ids: Vec<_> = report.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "fitness_20261019_001",
            "fitness_20261019_002",
            "fitness_20261019_001_es",
            "fitness_20261019_002_es",
        ]
    );
    assert_eq!(report.ok_count(), 4);
    assert!(report.skipped.is_empty());
    assert!(report.records.iter().all(|r| r.base_video_path.is_some() && r.final_video_path.is_some()));
    assert_eq!(report.records[2].title, "(es) Treino 1");
    assert_eq!(report.records[2].caption.as_deref(), Some("(es) Treino 1\n\n#fitness #shorts #tiktok"));

    // no media files
    assert!(!temp.path().join("media").exists());

    let manifest: BatchManifest =
        serde_json::from_str(&std::fs::read_to_string(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(report.manifest_path, temp.path().join("batches/lote_2026-10-19/batch_manifest.json"));
    assert_eq!(manifest.items.len(), 4);
    assert!(manifest.items.iter().all(|item| item.status == "ok" && item.error.is_none()));
    assert_eq!(manifest.items[3].lang, "es");
    assert_eq!(manifest.items[3].niche, "fitness");

    let batch_entries = std::fs::read_dir(temp.path().join("batches/lote_2026-10-19")).unwrap().count();
    assert_eq!(batch_entries, 1);
}

#[tokio::test]
async fn test_all_generation_attempts_fail() {
    struct Garbage;

    #[async_trait]
    impl ModelClient for Garbage {
        async fn complete(&self, _request: &ModelRequest) -> Result<String> {
            Ok("not json".to_string())
        }

        fn has_credential(&self) -> bool {
            true
        }
    }

    let temp = tempfile::tempdir().unwrap();
    let config = dry_run_config(temp.path());
    let workflow = Workflow::with_collaborators(
        config.clone(),
        Arc::new(Garbage),
        SpeechSynthesizerFactory::create_synthesizer(config.speech.clone()),
        MediaProcessorFactory::create_processor(config.media.clone()),
    );
    let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let report = workflow.run(RunOptions { scripts_file: None, date }).await.unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.average_base_render_seconds, 0.0);
    assert_eq!(report.average_template_render_seconds, 0.0);
    assert!(report.manifest_path.exists());
}
