//! Configuration management for the CV match scorer

use crate::analyzers::AnalyzerKind;
use crate::error::{CvMatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Allowed drift when checking that analyzer weights sum to one.
pub const WEIGHT_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub processing: ProcessingConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
    pub embedding_backend: EmbeddingBackend,
    pub hashing_dimensions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Static Model2Vec embeddings loaded from disk or the HuggingFace Hub
    Model2Vec,
    /// Feature-hashed bag of words, needs no model files
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub sentences_per_section: usize,
    pub chunk_word_budget: usize,
    pub max_document_chars: usize,
    pub max_parallel_analyzers: usize,
    #[serde(default)]
    pub extra_tech_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub cosine_low_threshold: f32,
    pub embedding_high_threshold: f32,
    pub embedding_low_threshold: f32,
    pub lsa_low_threshold: f32,
    pub lsa_components: usize,
    pub lsa_max_features: usize,
    pub top_terms: usize,
    pub topic_terms: usize,
    pub weights: AnalyzerWeights,
}

/// Per-analyzer weights used by the aggregation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerWeights {
    pub keyword: f32,
    pub embedding: f32,
    pub cosine: f32,
    pub jaccard: f32,
    pub ner: f32,
    pub lsa: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for AnalyzerWeights {
    fn default() -> Self {
        Self {
            keyword: 0.2,
            embedding: 0.2,
            cosine: 0.15,
            jaccard: 0.15,
            ner: 0.2,
            lsa: 0.1,
        }
    }
}

impl AnalyzerWeights {
    pub fn get(&self, kind: AnalyzerKind) -> f32 {
        match kind {
            AnalyzerKind::Keyword => self.keyword,
            AnalyzerKind::Embedding => self.embedding,
            AnalyzerKind::Cosine => self.cosine,
            AnalyzerKind::Jaccard => self.jaccard,
            AnalyzerKind::Ner => self.ner,
            AnalyzerKind::Lsa => self.lsa,
        }
    }

    pub fn sum(&self) -> f32 {
        AnalyzerKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(kind) = AnalyzerKind::ALL.iter().find(|kind| self.get(**kind) < 0.0) {
            return Err(CvMatchError::Configuration(format!(
                "Weight for analyzer '{}' must not be negative",
                kind
            )));
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CvMatchError::Configuration(format!(
                "Analyzer weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cv-match")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                default_embedding_model: "potion-base-8M".to_string(),
                embedding_backend: EmbeddingBackend::Model2Vec,
                hashing_dimensions: 512,
            },
            processing: ProcessingConfig {
                sentences_per_section: 10,
                chunk_word_budget: 512,
                max_document_chars: 200_000,
                max_parallel_analyzers: 6,
                extra_tech_terms: Vec::new(),
            },
            scoring: ScoringConfig {
                cosine_low_threshold: 0.4,
                embedding_high_threshold: 0.8,
                embedding_low_threshold: 0.4,
                lsa_low_threshold: 0.5,
                lsa_components: 100,
                lsa_max_features: 10_000,
                top_terms: 10,
                topic_terms: 5,
                weights: AnalyzerWeights::default(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the configuration from `path`, writing defaults on first use
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| CvMatchError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvMatchError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-match")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.weights.validate()?;

        let sizes = [
            ("processing.sentences_per_section", self.processing.sentences_per_section),
            ("processing.chunk_word_budget", self.processing.chunk_word_budget),
            ("processing.max_document_chars", self.processing.max_document_chars),
            ("processing.max_parallel_analyzers", self.processing.max_parallel_analyzers),
            ("models.hashing_dimensions", self.models.hashing_dimensions),
            ("scoring.lsa_components", self.scoring.lsa_components),
            ("scoring.lsa_max_features", self.scoring.lsa_max_features),
            ("scoring.top_terms", self.scoring.top_terms),
            ("scoring.topic_terms", self.scoring.topic_terms),
        ];
        for (key, value) in sizes {
            if value == 0 {
                return Err(CvMatchError::Configuration(format!("{} must be greater than zero", key)));
            }
        }

        let thresholds = [
            ("scoring.cosine_low_threshold", self.scoring.cosine_low_threshold),
            ("scoring.embedding_high_threshold", self.scoring.embedding_high_threshold),
            ("scoring.embedding_low_threshold", self.scoring.embedding_low_threshold),
            ("scoring.lsa_low_threshold", self.scoring.lsa_low_threshold),
        ];
        for (key, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(CvMatchError::Configuration(format!("{} must be within [0, 1]", key)));
            }
        }

        Ok(())
    }
}
