//! Similarity analyzers comparing a CV against a job description
//!
//! Every analyzer is a pure function of the two texts plus its shared,
//! read-only models. Degenerate input (empty documents, empty vocabularies)
//! yields a zero score; only genuine failures are returned as errors.

pub mod cosine;
pub mod embedding;
pub mod entity;
pub mod jaccard;
pub mod keyword;
pub mod lsa;

pub use cosine::{CosineAnalyzer, CosineDetails};
pub use embedding::{EmbeddingAnalyzer, EmbeddingDetails};
pub use entity::{EntityAnalyzer, EntityDetails};
pub use jaccard::{JaccardAnalyzer, JaccardDetails};
pub use keyword::{KeywordAnalyzer, KeywordDetails};
pub use lsa::{LsaAnalyzer, LsaDetails};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Keyword,
    Embedding,
    Cosine,
    Jaccard,
    Ner,
    Lsa,
}

impl AnalyzerKind {
    /// Fixed order used for metadata and reports
    pub const ALL: [AnalyzerKind; 6] = [
        AnalyzerKind::Keyword,
        AnalyzerKind::Embedding,
        AnalyzerKind::Cosine,
        AnalyzerKind::Jaccard,
        AnalyzerKind::Ner,
        AnalyzerKind::Lsa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Keyword => "keyword",
            AnalyzerKind::Embedding => "embedding",
            AnalyzerKind::Cosine => "cosine",
            AnalyzerKind::Jaccard => "jaccard",
            AnalyzerKind::Ner => "ner",
            AnalyzerKind::Lsa => "lsa",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f32,
    pub details: AnalysisDetails,
    pub matched_items: Vec<String>,
}

/// Analyzer-specific diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analyzer", rename_all = "snake_case")]
pub enum AnalysisDetails {
    Keyword(KeywordDetails),
    Embedding(EmbeddingDetails),
    Cosine(CosineDetails),
    Jaccard(JaccardDetails),
    Ner(EntityDetails),
    Lsa(LsaDetails),
}

impl AnalysisDetails {
    pub fn suggestions(&self) -> &[String] {
        match self {
            AnalysisDetails::Keyword(d) => &d.suggestions,
            AnalysisDetails::Embedding(d) => &d.suggestions,
            AnalysisDetails::Cosine(d) => &d.suggestions,
            AnalysisDetails::Jaccard(d) => &d.suggestions,
            AnalysisDetails::Ner(d) => &d.suggestions,
            AnalysisDetails::Lsa(d) => &d.suggestions,
        }
    }

    /// Everything the job asks for that the CV lacks, across all `missing_*` lists
    pub fn missing_items(&self) -> Vec<String> {
        match self {
            AnalysisDetails::Keyword(d) => d.missing_skills.clone(),
            AnalysisDetails::Embedding(_) => Vec::new(),
            AnalysisDetails::Cosine(d) => d.missing_terms.clone(),
            AnalysisDetails::Jaccard(d) => d
                .missing_keywords
                .iter()
                .chain(d.missing_entities.iter())
                .cloned()
                .collect(),
            AnalysisDetails::Ner(d) => d.missing_entities.clone(),
            AnalysisDetails::Lsa(d) => d.missing_topics.clone(),
        }
    }
}

/// Best similarity of one job section against any CV section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: String,
    pub similarity: f32,
}

impl AnalysisResult {
    pub fn new(score: f32, details: AnalysisDetails, matched_items: Vec<String>) -> Self {
        Self {
            score,
            details,
            matched_items,
        }
    }
}

/// `|a ∩ b| / |a ∪ b|`, zero when either side is empty
pub(crate) fn jaccard_index<T: Ord>(a: &std::collections::BTreeSet<T>, b: &std::collections::BTreeSet<T>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}

/// First `n` items joined for a suggestion line
pub(crate) fn preview(items: &[String], n: usize) -> String {
    items.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

pub(crate) fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}
