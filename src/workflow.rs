use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::batch::{BatchManifest, BatchOrganizer};
use crate::config::Config;
use crate::error::Result;
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::model::{ModelClient, ModelClientFactory};
use crate::record::{RenderStage, ScriptRecord, SkippedItem};
use crate::script::{load_scripts, save_scripts, GenerationRequest, ScriptGenerator};
use crate::speech::{SpeechSynthesizer, SpeechSynthesizerFactory};
use crate::stage::{BaseVideoStep, StageRunner, TemplateStep};
use crate::translate::Translator;

/// Per-run inputs that are not part of the configuration file
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Reviewed scripts to use instead of generating new ones
    pub scripts_file: Option<PathBuf>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub stage: &'static str,
    pub seconds: f64,
}

impl StageTiming {
    fn new(stage: &'static str, elapsed: Duration) -> Self {
        Self {
            stage,
            seconds: elapsed.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub stage_times: Vec<StageTiming>,
    pub total_seconds: f64,
    pub average_base_render_seconds: f64,
    pub average_template_render_seconds: f64,
    pub records: Vec<ScriptRecord>,
    pub skipped: Vec<SkippedItem>,
    pub scripts_path: Option<PathBuf>,
    pub manifest_path: PathBuf,
    /// What was written to `manifest_path`; counts are taken from here
    pub manifest: BatchManifest,
    /// Videos actually copied into the batch directory
    pub copied: usize,
}

impl RunReport {
    pub fn ok_count(&self) -> usize {
        self.manifest.ok_count()
    }

    pub fn failed_count(&self) -> usize {
        self.manifest.items.iter().filter(|item| item.status == "failed").count()
    }
}

/// Mean render time of one stage over records that ended `ok`; 0.0 when there are none
pub fn average_render_time(records: &[ScriptRecord], stage: RenderStage) -> f64 {
    let times: Vec<f64> = records
        .iter()
        .filter(|r| r.is_ok())
        .filter_map(|r| r.render_time(stage))
        .collect();

    if times.is_empty() {
        0.0
    } else {
        times.iter().sum::<f64>() / times.len() as f64
    }
}

/// Generate → Translate → Base-Render → Template-Render → Organize
pub struct Workflow {
    config: Config,
    generator: ScriptGenerator,
    translator: Translator,
    base_stage: StageRunner<BaseVideoStep>,
    template_stage: StageRunner<TemplateStep>,
    organizer: BatchOrganizer,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let client = ModelClientFactory::create_client(config.model.clone())?;
        let speech = SpeechSynthesizerFactory::create_synthesizer(config.speech.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        if !config.pipeline.dry_run {
            media.check_availability()?;
            speech.check_availability()?;
        }

        Ok(Self::with_collaborators(config, client, speech, media))
    }

    pub fn with_collaborators(
        config: Config,
        client: Arc<dyn ModelClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaProcessorTrait>,
    ) -> Self {
        let media_root = config.pipeline.media_root.clone();

        let generator = ScriptGenerator::new(client.clone(), config.generation.clone(), &config.retry);
        let translator = Translator::new(client, config.translation.clone(), &config.retry);
        let base_stage = StageRunner::new(BaseVideoStep::new(
            speech,
            media.clone(),
            config.media.clone(),
            media_root.clone(),
        ));
        let template_stage = StageRunner::new(TemplateStep::new(media, config.media.clone(), media_root));
        let organizer = BatchOrganizer::new(config.pipeline.batch_root.clone());

        Self {
            config,
            generator,
            translator,
            base_stage,
            template_stage,
            organizer,
        }
    }

    /// Run every stage once. Only fatal errors (credential, configuration,
    /// batch directory) abort; per-item problems end up in the report.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);
        self.run_stages(run_id, options).instrument(span).await
    }

    async fn run_stages(&self, run_id: Uuid, options: RunOptions) -> Result<RunReport> {
        let pipeline = &self.config.pipeline;
        let dry_run = pipeline.dry_run;
        let run_started = Instant::now();
        let mut stage_times = Vec::new();
        let mut skipped = Vec::new();
        let mut scripts_path = None;

        // 1. Generate (or load reviewed scripts)
        let started = Instant::now();
        let sources = match &options.scripts_file {
            Some(path) => {
                info!("Loading reviewed scripts from {}", path.display());
                load_scripts(path).await?
            }
            None => {
                let request = GenerationRequest {
                    niche: pipeline.niche.clone(),
                    count: pipeline.videos_per_batch,
                    target_duration_seconds: pipeline.target_duration_seconds,
                    source_language: pipeline.source_language.clone(),
                    date: options.date,
                };
                let generated = self.generator.generate(&request).await?;
                skipped.extend(generated.skipped);

                let path = pipeline
                    .media_root
                    .join("scripts")
                    .join(format!("roteiros_{}.json", options.date.format("%Y%m%d")));
                if dry_run {
                    info!("DRY RUN would save scripts for review: {}", path.display());
                } else {
                    match save_scripts(&generated.records, &path).await {
                        Ok(()) => scripts_path = Some(path),
                        Err(e) => warn!("Could not save scripts for review to {}: {}", path.display(), e),
                    }
                }
                generated.records
            }
        };
        stage_times.push(StageTiming::new("generate", started.elapsed()));

        // 2. Translate
        let started = Instant::now();
        let targets = pipeline.translation_targets();
        let translated = self.translator.translate(sources, &targets).await?;
        skipped.extend(translated.skipped);
        stage_times.push(StageTiming::new("translate", started.elapsed()));

        // 3. Base render
        let started = Instant::now();
        let records = self.base_stage.run(translated.records, dry_run).await;
        stage_times.push(StageTiming::new(RenderStage::BaseVideo.name(), started.elapsed()));

        // 4. Template render
        let started = Instant::now();
        let records = self.template_stage.run(records, dry_run).await;
        stage_times.push(StageTiming::new(RenderStage::Template.name(), started.elapsed()));

        // 5. Organize
        let started = Instant::now();
        let outcome = self.organizer.organize(&records, options.date, dry_run).await?;
        stage_times.push(StageTiming::new("organize", started.elapsed()));

        let report = RunReport {
            run_id,
            stage_times,
            total_seconds: run_started.elapsed().as_secs_f64(),
            average_base_render_seconds: average_render_time(&records, RenderStage::BaseVideo),
            average_template_render_seconds: average_render_time(&records, RenderStage::Template),
            records,
            skipped,
            scripts_path,
            manifest_path: outcome.manifest_path,
            manifest: outcome.manifest,
            copied: outcome.copied,
        };

        info!("Run finished: {} ok, {} failed, {} skipped in {:.2}s",
              report.ok_count(), report.failed_count(), report.skipped.len(), report.total_seconds);
        Ok(report)
    }
}

/// Effective settings, printed before a run
pub fn print_config_header(config: &Config) {
    let pipeline = &config.pipeline;
    println!("=== Fabrica weekly batch ===");
    println!("Niche:            {}", pipeline.niche);
    println!("Source language:  {}", pipeline.source_language);
    println!("Target languages: {}", pipeline.translation_targets().join(", "));
    println!("Videos per batch: {}", pipeline.videos_per_batch);
    println!("Dry run:          {}", if pipeline.dry_run { "yes" } else { "no" });
    println!();
}

pub fn print_summary(report: &RunReport) {
    println!();
    println!("=== Run {} ===", report.run_id);
    for timing in &report.stage_times {
        println!("{:<12} {:>8.2}s", timing.stage, timing.seconds);
    }
    println!("{:<12} {:>8.2}s", "total", report.total_seconds);
    println!();
    println!("Average base render:     {:.2}s", report.average_base_render_seconds);
    println!("Average template render: {:.2}s", report.average_template_render_seconds);
    println!("Records: {} ok, {} failed", report.ok_count(), report.failed_count());
    println!("Copied to batch: {}", report.copied);

    for item in report.manifest.items.iter().filter(|item| item.status == "failed") {
        println!("  FAILED {}_{}: {}", item.id, item.lang, item.error.as_deref().unwrap_or_default());
    }
    if !report.skipped.is_empty() {
        println!("Skipped: {}", report.skipped.len());
        for item in &report.skipped {
            println!("  SKIPPED {}: {}", item.id, item.reason);
        }
    }
    if let Some(path) = &report.scripts_path {
        println!("Scripts:  {}", path.display());
    }
    println!("Manifest: {}", report.manifest_path.display());
}
