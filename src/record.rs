use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome assigned by the media stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Ok,
    Failed(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Failed(error) => Some(error),
        }
    }
}

/// The two render stages that annotate a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    BaseVideo,
    Template,
}

impl RenderStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BaseVideo => "base-video",
            Self::Template => "template",
        }
    }
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A script as it moves through the pipeline.
///
/// Stages never edit a record in place: each one consumes the record and
/// returns an extended copy through the `with_*` methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub id: String,
    pub lang: String,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "script")]
    pub body: String,
    #[serde(alias = "duracao_target")]
    pub target_duration_seconds: u32,
    #[serde(alias = "nicho")]
    pub niche: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_video_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_video_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_render_time_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_render_time_seconds: Option<f64>,
}

/// A generation index or translation pair that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: String,
    pub reason: String,
}

/// Records produced by a model-backed stage plus whatever it had to drop
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub records: Vec<ScriptRecord>,
    pub skipped: Vec<SkippedItem>,
}

/// Identifier of the `index`-th script (1-based) of a batch.
///
/// The id becomes part of file names, so every run of characters other than
/// letters, digits, `-` and `_` in the niche collapses to a single `_`.
pub fn script_id(niche: &str, date: NaiveDate, index: u32) -> String {
    let niche = niche
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}_{:03}", niche, date.format("%Y%m%d"), index).to_lowercase()
}

/// Identifier of a translation derived from `source_id`
pub fn translated_id(source_id: &str, lang: &str) -> String {
    format!("{}_{}", source_id, lang)
}

impl ScriptRecord {
    pub fn new(
        id: impl Into<String>,
        lang: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        target_duration_seconds: u32,
        niche: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lang: lang.into(),
            title: title.into(),
            body: body.into(),
            target_duration_seconds,
            niche: niche.into(),
            status: None,
            base_video_path: None,
            final_video_path: None,
            caption: None,
            base_render_time_seconds: None,
            template_render_time_seconds: None,
        }
    }

    /// A fresh record for `lang` carrying translated text; stage annotations are not inherited
    pub fn translated(&self, lang: &str, title: String, body: String) -> Self {
        Self::new(
            translated_id(&self.id, lang),
            lang,
            title,
            body,
            self.target_duration_seconds,
            self.niche.clone(),
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, Some(RecordStatus::Failed(_)))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, Some(RecordStatus::Ok))
    }

    pub fn error(&self) -> Option<&str> {
        self.status.as_ref().and_then(RecordStatus::error)
    }

    /// `<id>_<lang>`, the stem shared by every media file of this record
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.id, self.lang)
    }

    pub fn render_time(&self, stage: RenderStage) -> Option<f64> {
        match stage {
            RenderStage::BaseVideo => self.base_render_time_seconds,
            RenderStage::Template => self.template_render_time_seconds,
        }
    }

    pub fn with_render_time(mut self, stage: RenderStage, seconds: f64) -> Self {
        match stage {
            RenderStage::BaseVideo => self.base_render_time_seconds = Some(seconds),
            RenderStage::Template => self.template_render_time_seconds = Some(seconds),
        }
        self
    }

    pub fn with_output(mut self, stage: RenderStage, path: PathBuf) -> Self {
        match stage {
            RenderStage::BaseVideo => self.base_video_path = Some(path),
            RenderStage::Template => self.final_video_path = Some(path),
        }
        self
    }

    pub fn with_caption(mut self, caption: String) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Marks the record `ok` unless an earlier stage already failed it
    pub fn succeeded(mut self) -> Self {
        if !self.is_failed() {
            self.status = Some(RecordStatus::Ok);
        }
        self
    }

    /// Marks the record `failed`; an earlier failure keeps its original cause
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        if !self.is_failed() {
            self.status = Some(RecordStatus::Failed(error.into()));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScriptRecord {
        ScriptRecord::new("fitness_20261019_001", "br", "Titulo", "Corpo", 40, "fitness")
    }

    #[test]
    fn test_script_id_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(script_id("Fitness", date, 1), "fitness_20261019_001");
        assert_eq!(script_id("Vida Saudavel", date, 12), "vida_saudavel_20261019_012");
        assert_eq!(script_id("saude/bem-estar", date, 1), "saude_bem-estar_20261019_001");
        assert_eq!(script_id("a\\b: c?", date, 2), "a_b_c_20261019_002");
    }

    #[test]
    fn test_translated_copies_metadata_not_annotations() {
        let source = sample()
            .with_output(RenderStage::BaseVideo, PathBuf::from("media/raw_videos/x.mp4"))
            .succeeded();
        let translated = source.translated("es", "Titulo ES".into(), "Cuerpo".into());

        assert_eq!(translated.id, "fitness_20261019_001_es");
        assert_eq!(translated.lang, "es");
        assert_eq!(translated.target_duration_seconds, 40);
        assert_eq!(translated.niche, "fitness");
        assert!(translated.status.is_none());
        assert!(translated.base_video_path.is_none());
    }

    #[test]
    fn test_failed_is_sticky() {
        let record = sample().failed("tts crashed").succeeded().failed("later cause");
        assert!(record.is_failed());
        assert_eq!(record.error(), Some("tts crashed"));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(RecordStatus::Ok.as_str(), "ok");
        assert_eq!(RecordStatus::Failed("x".into()).as_str(), "failed");
        assert_eq!(sample().file_stem(), "fitness_20261019_001_br");
    }

    #[test]
    fn test_reads_review_file_with_original_keys() {
        let json = r#"{
            "id": "fitness_20261019_001",
            "lang": "br",
            "titulo": "Treino rapido",
            "script": "Comece agora.",
            "duracao_target": 35,
            "nicho": "fitness"
        }"#;
        let record: ScriptRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Treino rapido");
        assert_eq!(record.target_duration_seconds, 35);
        assert!(record.status.is_none());
    }
}
