// Dated batch layout and manifest
//
// batches/lote_<YYYY-MM-DD>/<lang>/<id>_<lang>.mp4
// batches/lote_<YYYY-MM-DD>/<lang>/<id>_<lang>.txt
// batches/lote_<YYYY-MM-DD>/batch_manifest.json

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{FabricaError, Result};
use crate::record::{RecordStatus, ScriptRecord};

pub const MANIFEST_FILE: &str = "batch_manifest.json";

/// One manifest line per finalized record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub id: String,
    pub lang: String,
    pub video: PathBuf,
    pub caption: PathBuf,
    pub niche: String,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: String,
    pub items: Vec<ManifestItem>,
}

impl BatchManifest {
    pub fn ok_count(&self) -> usize {
        self.items.iter().filter(|item| item.status == "ok").count()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: BatchManifest,
    pub copied: usize,
}

pub struct BatchOrganizer {
    batch_root: PathBuf,
}

impl BatchOrganizer {
    pub fn new(batch_root: impl Into<PathBuf>) -> Self {
        Self {
            batch_root: batch_root.into(),
        }
    }

    /// `lote_<YYYY-MM-DD>`, shared by every run on the same day
    pub fn batch_dir(&self, date: NaiveDate) -> PathBuf {
        self.batch_root.join(format!("lote_{}", date.format("%Y-%m-%d")))
    }

    /// Copy every `ok` record into the dated batch and write the manifest.
    ///
    /// Per-record problems end up in the manifest entry; only failing to create
    /// the batch directory or to write the manifest is an error.
    pub async fn organize(&self, records: &[ScriptRecord], date: NaiveDate, dry_run: bool) -> Result<BatchOutcome> {
        let batch_dir = self.batch_dir(date);
        fs::create_dir_all(&batch_dir).await.map_err(|e| {
            FabricaError::Batch(format!("cannot create {}: {}", batch_dir.display(), e))
        })?;
        info!("Organizing {} records into {}", records.len(), batch_dir.display());

        let mut items = Vec::with_capacity(records.len());
        let mut copied = 0;

        for record in records {
            let lang_dir = batch_dir.join(&record.lang);
            let stem = record.file_stem();
            let mut item = ManifestItem {
                id: record.id.clone(),
                lang: record.lang.clone(),
                video: lang_dir.join(format!("{}.mp4", stem)),
                caption: lang_dir.join(format!("{}.txt", stem)),
                niche: record.niche.clone(),
                status: status_label(record.status.as_ref()).to_string(),
                error: record.error().map(str::to_string),
            };

            if record.is_ok() {
                if dry_run {
                    info!("DRY RUN would copy {} -> {}", stem, item.video.display());
                } else {
                    match place_record(record, &item.video, &item.caption).await {
                        Ok(()) => {
                            copied += 1;
                            info!("Copied {} -> {}", stem, item.video.display());
                        }
                        Err(e) => {
                            warn!("Could not place {} in batch: {}", stem, e);
                            item.status = "failed".to_string();
                            item.error = Some(e.to_string());
                        }
                    }
                }
            } else {
                info!("Skipping {} ({})", stem, item.status);
            }

            items.push(item);
        }

        let manifest = BatchManifest {
            created_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            items,
        };
        let manifest_path = batch_dir.join(MANIFEST_FILE);
        let content = serde_json::to_string_pretty(&manifest)?;
        fs::write(&manifest_path, content).await.map_err(|e| {
            FabricaError::Batch(format!("cannot write {}: {}", manifest_path.display(), e))
        })?;
        info!("Manifest written to {}", manifest_path.display());

        Ok(BatchOutcome {
            batch_dir,
            manifest_path,
            manifest,
            copied,
        })
    }
}

fn status_label(status: Option<&RecordStatus>) -> &'static str {
    status.map(RecordStatus::as_str).unwrap_or("pending")
}

async fn place_record(record: &ScriptRecord, video: &Path, caption: &Path) -> Result<()> {
    let source = record.final_video_path.as_deref().ok_or_else(|| {
        FabricaError::Batch(format!("{} has no final video", record.file_stem()))
    })?;
    if let Some(lang_dir) = video.parent() {
        fs::create_dir_all(lang_dir).await?;
    }

    fs::copy(source, video).await.map_err(|e| {
        FabricaError::Batch(format!("copy {} failed: {}", source.display(), e))
    })?;
    fs::write(caption, record.caption.as_deref().unwrap_or_default()).await?;
    Ok(())
}
