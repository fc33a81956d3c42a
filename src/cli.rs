use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Produce this week's batch: scripts, translations, videos and manifest
    Run {
        /// Topic steering prompts and hashtags
        #[arg(short, long)]
        niche: Option<String>,

        /// Number of scripts to generate
        #[arg(long)]
        videos: Option<u32>,

        /// Simulate rendering and copying; only bookkeeping and the manifest are written
        #[arg(long)]
        dry_run: bool,

        /// Target languages for translation (comma-separated)
        #[arg(short, long)]
        languages: Option<String>,

        /// Reviewed scripts file to use instead of generating new scripts
        #[arg(short, long)]
        scripts_file: Option<PathBuf>,
    },

    /// Check external tools, filters and credentials
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

/// Split a comma-separated language list, dropping blanks
pub fn parse_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let args = Args::parse_from([
            "fabrica", "-v", "run", "--niche", "fitness", "--videos", "2", "--dry-run", "-l", "es,en",
        ]);

        assert!(args.verbose);
        match args.command {
            Commands::Run { niche, videos, dry_run, languages, scripts_file } => {
                assert_eq!(niche.as_deref(), Some("fitness"));
                assert_eq!(videos, Some(2));
                assert!(dry_run);
                assert_eq!(languages.as_deref(), Some("es,en"));
                assert!(scripts_file.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_languages() {
        assert_eq!(parse_languages(" ES, en,,"), vec!["es".to_string(), "en".to_string()]);
        assert!(parse_languages("").is_empty());
    }
}
