// Environment report for the `check` command

use crate::config::{Config, ModelProvider};
use crate::media::{MediaCommand, MediaProcessorFactory};
use crate::model::{ollama::OllamaClient, ModelClientFactory};
use crate::speech::SpeechSynthesizerFactory;

/// Outcome of one check: detail on success, cause on failure
#[derive(Debug, Clone, PartialEq)]
pub struct CheckItem {
    pub name: String,
    pub outcome: std::result::Result<String, String>,
}

impl CheckItem {
    fn new(name: &str, outcome: std::result::Result<String, String>) -> Self {
        Self {
            name: name.to_string(),
            outcome,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn line(&self) -> String {
        match &self.outcome {
            Ok(detail) if detail.is_empty() => format!("[OK]     {}", self.name),
            Ok(detail) => format!("[OK]     {}: {}", self.name, detail),
            Err(cause) => format!("[FAILED] {}: {}", self.name, cause),
        }
    }
}

/// Probe every external dependency a real (non dry-run) batch needs
pub async fn run_checks(config: &Config) -> Vec<CheckItem> {
    let mut items = Vec::new();

    items.push(CheckItem::new(
        "configuration",
        config.validate().map(|_| String::new()).map_err(|e| e.to_string()),
    ));

    let media = MediaProcessorFactory::create_processor(config.media.clone());
    items.push(CheckItem::new(
        "ffmpeg",
        media.get_version_info().await.map_err(|e| e.to_string()),
    ));

    let probe = MediaCommand::new(&config.media.probe_path, "Probe version check")
        .arg("-version")
        .execute_capture()
        .await
        .map(|stdout| stdout.lines().next().unwrap_or_default().to_string())
        .map_err(|e| e.to_string());
    items.push(CheckItem::new("ffprobe", probe));

    let support = media.filter_support().await;
    items.push(CheckItem::new(
        "drawtext filter (title, watermark)",
        if support.drawtext { Ok(String::new()) } else { Err("not available, overlays will be omitted".to_string()) },
    ));
    items.push(CheckItem::new(
        "subtitles filter",
        if support.subtitles { Ok(String::new()) } else { Err("not available, subtitles will be omitted".to_string()) },
    ));

    let speech = SpeechSynthesizerFactory::create_synthesizer(config.speech.clone());
    items.push(CheckItem::new(
        "speech synthesizer",
        speech
            .check_availability()
            .map(|_| config.speech.binary_path.clone())
            .map_err(|e| e.to_string()),
    ));

    match config.model.provider {
        ModelProvider::OpenAi => {
            let credential = match ModelClientFactory::create_client(config.model.clone()) {
                Ok(client) if client.has_credential() => Ok(String::new()),
                Ok(_) => Err("OPENAI_API_KEY is not set".to_string()),
                Err(e) => Err(e.to_string()),
            };
            items.push(CheckItem::new("model credential", credential));
        }
        ModelProvider::Ollama => {
            let model = &config.generation.model;
            let available = match OllamaClient::new(config.model.clone()) {
                Ok(client) => client.check_model(model).await.map(|_| model.clone()).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            items.push(CheckItem::new("ollama model", available));
        }
    }

    items
}

/// Print one line per check; true when everything passed
pub fn print_report(items: &[CheckItem]) -> bool {
    for item in items {
        println!("{}", item.line());
    }
    items.iter().all(CheckItem::passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        assert_eq!(CheckItem::new("ffmpeg", Ok("ffmpeg version 6.1".into())).line(), "[OK]     ffmpeg: ffmpeg version 6.1");
        assert_eq!(CheckItem::new("configuration", Ok(String::new())).line(), "[OK]     configuration");
        assert_eq!(CheckItem::new("ffprobe", Err("not found".into())).line(), "[FAILED] ffprobe: not found");
    }

    #[tokio::test]
    async fn test_missing_tools_are_reported() {
        let mut config = Config::default();
        config.media.binary_path = "/nonexistent/fabrica-ffmpeg".to_string();
        config.media.probe_path = "/nonexistent/fabrica-ffprobe".to_string();
        config.speech.binary_path = "/nonexistent/fabrica-espeak".to_string();
        config.model.api_key = None;

        let items = run_checks(&config).await;

        assert!(items[0].passed());
        let failed: Vec<_> = items.iter().filter(|i| !i.passed()).map(|i| i.name.as_str()).collect();
        assert_eq!(
            failed,
            vec![
                "ffmpeg",
                "ffprobe",
                "drawtext filter (title, watermark)",
                "subtitles filter",
                "speech synthesizer",
                "model credential"
            ]
        );
        assert!(!print_report(&items));
    }
}
