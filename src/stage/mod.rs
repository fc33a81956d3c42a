// Media stage runner
//
// Both render stages share the same per-record bookkeeping: failed records pass
// through, dry runs only synthesize paths, and a render error is caught at the
// record boundary. The stage-specific work lives behind `RenderStep`.

pub mod base_video;
pub mod template;

#[cfg(test)]
pub(crate) mod fakes;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

pub use base_video::BaseVideoStep;
pub use template::TemplateStep;

use crate::error::Result;
use crate::record::{RenderStage, ScriptRecord};

/// The external render work of one stage
#[async_trait]
pub trait RenderStep: Send + Sync {
    fn stage(&self) -> RenderStage;

    /// Where this stage writes its file for `record`
    fn output_path(&self, record: &ScriptRecord) -> PathBuf;

    /// Produce the stage's media file at `output_path`
    async fn render(&self, record: &ScriptRecord, output_path: &Path) -> Result<()>;

    /// Annotate a record whose render succeeded (or was simulated)
    fn complete(&self, record: ScriptRecord, output_path: PathBuf) -> ScriptRecord {
        record.with_output(self.stage(), output_path)
    }
}

pub struct StageRunner<S: RenderStep> {
    step: S,
}

impl<S: RenderStep> StageRunner<S> {
    pub fn new(step: S) -> Self {
        Self { step }
    }

    /// Annotate every record in order; never fails as a whole
    pub async fn run(&self, records: Vec<ScriptRecord>, dry_run: bool) -> Vec<ScriptRecord> {
        let stage = self.step.stage();
        info!("Stage {}: {} records{}", stage, records.len(), if dry_run { " (dry run)" } else { "" });

        let progress = progress_bar(records.len() as u64, stage);
        let mut annotated = Vec::with_capacity(records.len());

        for record in records {
            progress.set_message(record.file_stem());
            annotated.push(self.process(record, dry_run).await);
            progress.inc(1);
        }

        progress.finish_and_clear();

        let failed = annotated.iter().filter(|r| r.is_failed()).count();
        info!("Stage {} finished: {} ok, {} failed", stage, annotated.len() - failed, failed);
        annotated
    }

    async fn process(&self, record: ScriptRecord, dry_run: bool) -> ScriptRecord {
        let stage = self.step.stage();

        if record.is_failed() {
            info!("[{}] {} skipped, already failed", stage, record.file_stem());
            return record.with_render_time(stage, 0.0);
        }

        let started = Instant::now();
        let output_path = self.step.output_path(&record);

        if dry_run {
            info!("[{}] DRY RUN {} -> {}", stage, record.file_stem(), output_path.display());
            let elapsed = started.elapsed().as_secs_f64();
            return self
                .step
                .complete(record, output_path)
                .succeeded()
                .with_render_time(stage, elapsed);
        }

        match self.step.render(&record, &output_path).await {
            Ok(()) => {
                let elapsed = started.elapsed().as_secs_f64();
                info!("[{}] {} rendered in {:.2}s", stage, record.file_stem(), elapsed);
                self.step
                    .complete(record, output_path)
                    .succeeded()
                    .with_render_time(stage, elapsed)
            }
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                warn!("[{}] {} failed: {}", stage, record.file_stem(), e);
                record.failed(e.to_string()).with_render_time(stage, elapsed)
            }
        }
    }
}

fn progress_bar(len: u64, stage: RenderStage) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(style.progress_chars("#>-"));
    }
    progress.set_prefix(stage.name());
    progress
}

/// Create the parent directory of `path` if it is missing
pub(crate) async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}
