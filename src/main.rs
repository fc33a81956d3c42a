//! Fabrica - weekly short-form vertical video factory
//!
//! Entry point: generates scripts with a language model, translates them,
//! narrates and renders vertical videos with ffmpeg, and files everything
//! into a dated batch with a manifest.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fabrica::check::{print_report, run_checks};
use fabrica::cli::{parse_languages, Args, Commands};
use fabrica::config::Config;
use fabrica::workflow::{print_config_header, print_summary, RunOptions, Workflow};

const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Fabrica");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    // The credential is the only setting read from the environment
    if config.model.api_key.is_none() {
        config.model.api_key = std::env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty());
    }

    match args.command {
        Commands::Run { niche, videos, dry_run, languages, scripts_file } => {
            if let Some(niche) = niche {
                config.pipeline.niche = niche;
            }
            if let Some(videos) = videos {
                config.pipeline.videos_per_batch = videos;
            }
            if let Some(languages) = languages {
                config.pipeline.target_languages = parse_languages(&languages);
            }
            config.pipeline.dry_run |= dry_run;
            config.validate()?;

            print_config_header(&config);

            let workflow = Workflow::new(config)?;
            let options = RunOptions {
                scripts_file,
                date: Local::now().date_naive(),
            };
            let report = workflow.run(options).await?;
            print_summary(&report);
        }
        Commands::Check => {
            let items = run_checks(&config).await;
            if !print_report(&items) {
                warn!("Environment check found problems");
                std::process::exit(1);
            }
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                anyhow::bail!("{} already exists", output.display());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    info!("Fabrica finished");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".fabrica").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "fabrica.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("fabrica.log").display());

    Ok(())
}
