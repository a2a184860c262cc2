//! TF-IDF cosine similarity between document sections

use super::{mean, preview, AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind, SectionScore};
use crate::error::Result;
use crate::processing::lexicon::english_stop_words;
use crate::processing::text_processor::TextPreprocessor;
use crate::processing::tfidf::{cosine, TfidfVectorizer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosineDetails {
    /// One entry per job section, in document order
    pub section_similarities: Vec<SectionScore>,
    pub important_terms: Vec<String>,
    pub missing_terms: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct CosineAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
    stop_words: HashSet<String>,
    low_threshold: f32,
    top_terms: usize,
}

impl CosineAnalyzer {
    pub fn new(preprocessor: Arc<TextPreprocessor>, low_threshold: f32, top_terms: usize) -> Self {
        Self {
            preprocessor,
            stop_words: english_stop_words(),
            low_threshold,
            top_terms,
        }
    }

    fn empty_result() -> AnalysisResult {
        AnalysisResult::new(0.0, AnalysisDetails::Cosine(CosineDetails::default()), Vec::new())
    }
}

impl Analyzer for CosineAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Cosine
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let cv_sections = self.preprocessor.sections(cv_text);
        let job_sections = self.preprocessor.sections(job_text);
        if job_sections.is_empty() {
            return Ok(Self::empty_result());
        }

        let n_cv = cv_sections.len();
        let corpus: Vec<String> = cv_sections.into_iter().chain(job_sections).collect();
        let tfidf = TfidfVectorizer::new(&self.stop_words)
            .sublinear_tf(true)
            .fit_transform(&corpus);
        if tfidf.is_empty() {
            return Ok(Self::empty_result());
        }

        let mut section_similarities = Vec::new();
        let mut maxima = Vec::new();
        let mut important_terms = BTreeSet::new();
        let mut missing_terms = BTreeSet::new();
        let mut suggestions = Vec::new();

        for row in n_cv..corpus.len() {
            let section = format!("section_{}", row - n_cv);
            let job_vector = tfidf.matrix.row(row);
            let best = (0..n_cv)
                .map(|cv_row| cosine(job_vector, tfidf.matrix.row(cv_row)))
                .fold(0.0f64, f64::max) as f32;

            let terms = tfidf.top_terms(row, self.top_terms);
            if best < self.low_threshold {
                suggestions.push(format!(
                    "Section {} needs improvement. Consider adding content related to: {}",
                    section,
                    preview(&terms, 5)
                ));
                missing_terms.extend(terms.iter().cloned());
            }
            important_terms.extend(terms);

            maxima.push(best);
            section_similarities.push(SectionScore {
                section,
                similarity: best,
            });
        }

        let matched_items = important_terms.difference(&missing_terms).cloned().collect();

        Ok(AnalysisResult::new(
            mean(&maxima),
            AnalysisDetails::Cosine(CosineDetails {
                section_similarities,
                important_terms: important_terms.into_iter().collect(),
                missing_terms: missing_terms.into_iter().collect(),
                suggestions,
            }),
            matched_items,
        ))
    }
}
