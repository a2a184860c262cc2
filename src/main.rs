//! cv-match: score a CV against a job description

use clap::Parser;
use cv_match::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use cv_match::config::OutputFormat;
use cv_match::output::formatter::formatter_for;
use cv_match::processing::embedding_manager::EmbeddingModelManager;
use cv_match::{AnalysisEngine, Config, CvMatchError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Analyze {
            cv,
            job,
            output,
            save,
            detailed,
            embedding_backend,
        } => {
            if let Some(backend) = embedding_backend {
                config.models.embedding_backend =
                    cli::parse_embedding_backend(&backend).map_err(CvMatchError::InvalidInput)?;
            }
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(CvMatchError::InvalidInput)?,
                None => config.output.format,
            };
            let detailed = detailed || config.output.detailed;

            let cv_text = read_document(&cv).await?;
            let job_text = read_document(&job).await?;

            let spinner = spinner("Loading models...");
            let engine = AnalysisEngine::new(&config).await;
            spinner.set_message("Running analyzers...");
            let report = match engine {
                Ok(engine) => engine.analyze(&cv_text, &job_text).await,
                Err(e) => Err(e),
            };
            spinner.finish_and_clear();
            let report = report?;

            let use_colors = config.output.color_output && output_format == OutputFormat::Console;
            let formatter = formatter_for(output_format, use_colors, detailed);
            println!("{}", formatter.format_report(&report)?);

            if let Some(path) = save {
                let json = report.to_json()?;
                tokio::fs::write(&path, json).await.map_err(|e| {
                    CvMatchError::OutputFormatting(format!("Failed to write report to {}: {}", path.display(), e))
                })?;
                log::info!("Report saved to {}", path.display());
            }
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            match action {
                ModelAction::List => {
                    println!("Embedding models (recommended: {})\n", manager.auto_select_model());
                    for (id, info) in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(id) { "downloaded" } else { "available" };
                        println!("  • {} ({}) - {} MB, {} dims [{}]", id, info.repo_id, info.size_mb, info.dimensions, status);
                        println!("    {}", info.description);
                    }
                }
                ModelAction::Download { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| CvMatchError::ModelLoading(format!("Unknown embedding model: {}", model)))?;

                    let spinner = spinner(&format!("Downloading {}...", model_id));
                    let result = manager.download_model(&model_id).await;
                    spinner.finish_and_clear();

                    println!("Model '{}' is available at {}", model_id, result?.display());
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| CvMatchError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", content);
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }
            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CvMatchError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
