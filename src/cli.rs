//! CLI interface for the CV match scorer

use crate::config::{EmbeddingBackend, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-match")]
#[command(about = "Score how well a CV matches a job description")]
#[command(long_about = "Score a CV against a job description with keyword, TF-IDF, Jaccard, entity, embedding and LSA analyzers combined into one weighted report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a CV against a job description
    Analyze {
        /// Path to the CV (plain text)
        #[arg(long)]
        cv: PathBuf,

        /// Path to the job description (plain text)
        #[arg(short, long)]
        job: PathBuf,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Save the JSON report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show per-analyzer details
        #[arg(short, long)]
        detailed: bool,

        /// Embedding backend: model2vec, hashing
        #[arg(long)]
        embedding_backend: Option<String>,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model ID, display name or HuggingFace repo ID
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

pub fn parse_embedding_backend(backend: &str) -> Result<EmbeddingBackend, String> {
    match backend.to_lowercase().as_str() {
        "model2vec" => Ok(EmbeddingBackend::Model2Vec),
        "hashing" => Ok(EmbeddingBackend::Hashing),
        _ => Err(format!("Invalid embedding backend: {}. Supported: model2vec, hashing", backend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("console"), Ok(OutputFormat::Console));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_parse_analyze_command() {
        let cli = Cli::parse_from([
            "cv-match", "analyze", "--cv", "cv.txt", "--job", "job.txt", "--output", "json", "--embedding-backend",
            "hashing", "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze {
                cv,
                output,
                embedding_backend,
                ..
            } => {
                assert_eq!(cv, PathBuf::from("cv.txt"));
                assert_eq!(output.as_deref(), Some("json"));
                assert_eq!(
                    parse_embedding_backend(embedding_backend.as_deref().unwrap()),
                    Ok(EmbeddingBackend::Hashing)
                );
            }
            _ => panic!("expected analyze command"),
        }
    }
}
