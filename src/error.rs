//! Error handling for the CV match scorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, CvMatchError>;

/// Convert anyhow errors (raised by the Model2Vec loader) to our custom error type
impl From<anyhow::Error> for CvMatchError {
    fn from(err: anyhow::Error) -> Self {
        CvMatchError::ModelLoading(err.to_string())
    }
}
