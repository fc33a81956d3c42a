use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{FabricaError, Result};

/// Shortest time a subtitle cue stays on screen
const MIN_CUE_SECONDS: f64 = 0.1;

/// One burned-in subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Split `text` into groups of at most `max_words` words
pub fn split_text(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Spread the chunks of `text` evenly across `duration` seconds
pub fn build_cues(text: &str, duration: f64, max_words: usize) -> Vec<SubtitleCue> {
    let chunks = split_text(text, max_words);
    if chunks.is_empty() {
        return Vec::new();
    }

    let cue_duration = (duration / chunks.len() as f64).max(MIN_CUE_SECONDS);
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let start = index as f64 * cue_duration;
            SubtitleCue {
                start,
                end: start + cue_duration,
                text,
            }
        })
        .collect()
}

/// Render cues in SRT format
pub fn to_srt(cues: &[SubtitleCue]) -> String {
    let mut srt_content = String::new();

    for (index, cue) in cues.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text.trim()
        ));
    }

    srt_content
}

/// Write cues as an SRT subtitle file
pub async fn write_srt<P: AsRef<Path>>(cues: &[SubtitleCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, to_srt(cues)).await
        .map_err(FabricaError::Io)?;

    Ok(())
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Post caption: title, blank line, niche hashtags
pub fn build_caption(title: &str, niche: &str) -> String {
    let niche_tag: String = niche.split_whitespace().collect();
    let hashtags = [format!("#{}", niche_tag), "#shorts".to_string(), "#tiktok".to_string()];
    format!("{}\n\n{}", title, hashtags.join(" "))
}
