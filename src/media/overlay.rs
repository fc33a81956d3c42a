use std::path::{Path, PathBuf};

use crate::config::MediaConfig;
use crate::subtitle::{build_cues, SubtitleCue};

const TITLE_FONT_SIZE: u32 = 60;
const TITLE_TOP: u32 = 200;
const WATERMARK_FONT_SIZE: u32 = 32;
const WATERMARK_TOP: u32 = 60;
/// Horizontal margin kept free around the title text
const TITLE_SIDE_MARGIN: u32 = 120;
/// Subtitle style in libass script units (PlayResY 288)
const SUBTITLE_STYLE: &str = "Fontsize=16,PrimaryColour=&H00FFFFFF,Alignment=2,MarginV=56";

/// Which optional ffmpeg filters this build supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSupport {
    pub drawtext: bool,
    pub subtitles: bool,
}

impl FilterSupport {
    pub fn all() -> Self {
        Self {
            drawtext: true,
            subtitles: true,
        }
    }

    /// Read `ffmpeg -filters` output, one filter per line: `flags name io description`
    pub fn from_filter_listing(listing: &str) -> Self {
        let has = |name: &str| {
            listing
                .lines()
                .any(|line| line.split_whitespace().nth(1) == Some(name))
        };

        Self {
            drawtext: has("drawtext"),
            subtitles: has("subtitles"),
        }
    }
}

/// An overlay resolved to files on disk, ready for the filter chain
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Text {
        text_file: PathBuf,
        font_size: u32,
        top: u32,
        font_file: Option<PathBuf>,
    },
    Subtitles {
        srt_file: PathBuf,
    },
}

impl Overlay {
    pub fn to_filter(&self) -> String {
        match self {
            Self::Text { text_file, font_size, top, font_file } => {
                let mut filter = format!(
                    "drawtext=textfile={}:fontsize={}:fontcolor=white:x=(w-text_w)/2:y={}",
                    escape_filter_path(text_file),
                    font_size,
                    top
                );
                if let Some(font) = font_file {
                    filter.push_str(&format!(":fontfile={}", escape_filter_path(font)));
                }
                filter
            }
            Self::Subtitles { srt_file } => {
                format!(
                    "subtitles={}:force_style='{}'",
                    escape_filter_path(srt_file),
                    SUBTITLE_STYLE
                )
            }
        }
    }
}

/// Text that still has to be written to a file before it can be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedText {
    pub text: String,
    pub font_size: u32,
    pub top: u32,
}

impl PlannedText {
    pub fn into_overlay(self, text_file: PathBuf, font_file: Option<PathBuf>) -> Overlay {
        Overlay::Text {
            text_file,
            font_size: self.font_size,
            top: self.top,
            font_file,
        }
    }
}

/// Title card near the top of the base video; absent without drawtext or title
pub fn plan_title(support: FilterSupport, title: &str, config: &MediaConfig) -> Option<PlannedText> {
    if !support.drawtext || title.trim().is_empty() {
        return None;
    }

    let usable_width = config.width.saturating_sub(TITLE_SIDE_MARGIN);
    // average glyph is roughly half as wide as the font size
    let max_chars = (usable_width / (TITLE_FONT_SIZE / 2)).max(8) as usize;

    Some(PlannedText {
        text: wrap_text(title.trim(), max_chars),
        font_size: TITLE_FONT_SIZE,
        top: TITLE_TOP,
    })
}

/// Watermark at the top of the final video; absent without drawtext or text
pub fn plan_watermark(support: FilterSupport, config: &MediaConfig) -> Option<PlannedText> {
    if !support.drawtext || config.watermark.trim().is_empty() {
        return None;
    }

    Some(PlannedText {
        text: config.watermark.trim().to_string(),
        font_size: WATERMARK_FONT_SIZE,
        top: WATERMARK_TOP,
    })
}

/// Burned-in subtitles for the body; absent without the filter or any words
pub fn plan_subtitles(
    support: FilterSupport,
    body: &str,
    duration: f64,
    config: &MediaConfig,
) -> Option<Vec<SubtitleCue>> {
    if !support.subtitles {
        return None;
    }

    let cues = build_cues(body, duration, config.subtitle_words_per_chunk);
    if cues.is_empty() { None } else { Some(cues) }
}

/// Greedy word wrap to lines of at most `max_chars` characters
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Escape a path for use as a filter option value inside `-vf`
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | ':' | '\'' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = " ... drawtext          V->V       Draw text on top of video frames using libfreetype library.\n \
                           ... subtitles         V->V       Render text subtitles onto input video using the libass library.\n \
                           ... scale             V->V       Scale the input video size and/or convert the image format.";

    #[test]
    fn test_filter_listing() {
        assert_eq!(FilterSupport::from_filter_listing(LISTING), FilterSupport::all());

        let minimal = FilterSupport::from_filter_listing(" ... scale  V->V  Scale");
        assert!(!minimal.drawtext && !minimal.subtitles);
    }

    #[test]
    fn test_overlays_absent_without_filters() {
        let config = MediaConfig::default();
        let none = FilterSupport::default();

        assert!(plan_title(none, "Titulo", &config).is_none());
        assert!(plan_watermark(none, &config).is_none());
        assert!(plan_subtitles(none, "um dois", 4.0, &config).is_none());
    }

    #[test]
    fn test_overlays_absent_without_content() {
        let config = MediaConfig {
            watermark: String::new(),
            ..MediaConfig::default()
        };
        let all = FilterSupport::all();

        assert!(plan_title(all, "   ", &config).is_none());
        assert!(plan_watermark(all, &config).is_none());
        assert!(plan_subtitles(all, "", 4.0, &config).is_none());
    }

    #[test]
    fn test_title_is_wrapped() {
        let planned = plan_title(
            FilterSupport::all(),
            "Cinco habitos simples que mudam a sua manha para sempre",
            &MediaConfig::default(),
        )
        .unwrap();

        assert!(planned.text.lines().count() > 1);
        assert!(planned.text.lines().all(|line| line.chars().count() <= 32));
    }

    #[test]
    fn test_wrap_keeps_long_words_whole() {
        assert_eq!(wrap_text("supercalifragilistic ok", 5), "supercalifragilistic\nok");
        assert_eq!(wrap_text("a b c", 10), "a b c");
    }

    #[test]
    fn test_filters_escape_paths() {
        let overlay = PlannedText {
            text: "x".into(),
            font_size: 32,
            top: 60,
        }
        .into_overlay(PathBuf::from("C:/media/wm.txt"), None);

        assert_eq!(
            overlay.to_filter(),
            "drawtext=textfile=C\\:/media/wm.txt:fontsize=32:fontcolor=white:x=(w-text_w)/2:y=60"
        );

        let subs = Overlay::Subtitles { srt_file: PathBuf::from("media/subtitles/a.srt") };
        assert!(subs.to_filter().starts_with("subtitles=media/subtitles/a.srt:force_style='Fontsize=16"));
    }
}
