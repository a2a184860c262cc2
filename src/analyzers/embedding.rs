//! Semantic similarity of document sections using text embeddings

use super::{mean, AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind, SectionScore};
use crate::error::Result;
use crate::processing::embeddings::{cosine_similarity, document_embedding, Embedder};
use crate::processing::text_processor::TextPreprocessor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingDetails {
    pub section_similarities: Vec<SectionScore>,
    pub high_match_sections: Vec<String>,
    pub low_match_sections: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct EmbeddingAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
    embedder: Arc<dyn Embedder>,
    chunk_word_budget: usize,
    high_threshold: f32,
    low_threshold: f32,
}

impl EmbeddingAnalyzer {
    pub fn new(
        preprocessor: Arc<TextPreprocessor>,
        embedder: Arc<dyn Embedder>,
        chunk_word_budget: usize,
        high_threshold: f32,
        low_threshold: f32,
    ) -> Self {
        Self {
            preprocessor,
            embedder,
            chunk_word_budget,
            high_threshold,
            low_threshold,
        }
    }

    fn embed_sections(&self, sections: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(sections.len());
        for section in sections {
            if let Some(embedding) = document_embedding(self.embedder.as_ref(), section, self.chunk_word_budget)? {
                embeddings.push(embedding);
            }
        }
        Ok(embeddings)
    }

    fn empty_result() -> AnalysisResult {
        AnalysisResult::new(0.0, AnalysisDetails::Embedding(EmbeddingDetails::default()), Vec::new())
    }
}

impl Analyzer for EmbeddingAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Embedding
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let cv_sections = self.preprocessor.sections(cv_text);
        let job_sections = self.preprocessor.sections(job_text);
        if cv_sections.is_empty() || job_sections.is_empty() {
            return Ok(Self::empty_result());
        }

        let cv_embeddings = self.embed_sections(&cv_sections)?;
        let job_embeddings = self.embed_sections(&job_sections)?;
        if cv_embeddings.is_empty() || job_embeddings.is_empty() {
            return Ok(Self::empty_result());
        }

        let mut section_similarities = Vec::with_capacity(job_embeddings.len());
        let mut high_match_sections = Vec::new();
        let mut low_match_sections = Vec::new();
        let mut maxima = Vec::with_capacity(job_embeddings.len());

        for (i, job_embedding) in job_embeddings.iter().enumerate() {
            let mut best = 0.0f32;
            for cv_embedding in &cv_embeddings {
                best = best.max(cosine_similarity(job_embedding, cv_embedding)?);
            }

            let section = format!("section_{}", i);
            if best >= self.high_threshold {
                high_match_sections.push(section.clone());
            } else if best <= self.low_threshold {
                low_match_sections.push(section.clone());
            }
            section_similarities.push(SectionScore {
                section,
                similarity: best,
            });
            maxima.push(best);
        }

        let mut suggestions = Vec::new();
        if !low_match_sections.is_empty() {
            suggestions.push(format!(
                "Consider expanding these sections to better match the job requirements: {}",
                low_match_sections.join(", ")
            ));
        }

        log::debug!(
            "{} embedded {} CV and {} job sections",
            self.embedder.name(),
            cv_embeddings.len(),
            job_embeddings.len()
        );

        Ok(AnalysisResult::new(
            mean(&maxima),
            AnalysisDetails::Embedding(EmbeddingDetails {
                section_similarities,
                high_match_sections: high_match_sections.clone(),
                low_match_sections,
                suggestions,
            }),
            high_match_sections,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CvMatchError;
    use crate::processing::embeddings::HashingEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        inner: HashingEmbedder,
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.encode(texts)
        }
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn name(&self) -> &str {
            "broken"
        }

        fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(CvMatchError::Embedding("backend unavailable".to_string()))
        }
    }

    fn analyzer(embedder: Arc<dyn Embedder>) -> EmbeddingAnalyzer {
        EmbeddingAnalyzer::new(Arc::new(TextPreprocessor::new().unwrap()), embedder, 512, 0.8, 0.4)
    }

    fn details(result: &AnalysisResult) -> &EmbeddingDetails {
        match &result.details {
            AnalysisDetails::Embedding(details) => details,
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_identical_documents_match_highly() {
        let text = "Led a team of five engineers. Shipped a recommendation service in Rust.";
        let result = analyzer(Arc::new(HashingEmbedder::new(256).unwrap()))
            .analyze(text, text)
            .unwrap();

        assert!((result.score - 1.0).abs() < 1e-5);
        assert_eq!(result.matched_items, vec!["section_0".to_string()]);
        assert!(details(&result).suggestions.is_empty());
    }

    #[test]
    fn test_unrelated_sections_get_a_suggestion() {
        let result = analyzer(Arc::new(HashingEmbedder::new(1024).unwrap()))
            .analyze("Pastry chef baking sourdough.", "Kubernetes operator in golang.")
            .unwrap();

        let details = details(&result);
        assert_eq!(details.low_match_sections, vec!["section_0".to_string()]);
        assert_eq!(
            details.suggestions,
            vec!["Consider expanding these sections to better match the job requirements: section_0".to_string()]
        );
        assert!(result.matched_items.is_empty());
    }

    #[test]
    fn test_empty_input_skips_the_model() {
        let embedder = Arc::new(CountingEmbedder {
            inner: HashingEmbedder::new(32).unwrap(),
            calls: AtomicUsize::new(0),
        });
        let analyzer = analyzer(embedder.clone());

        assert_eq!(analyzer.analyze("Rust developer", "").unwrap().score, 0.0);
        assert_eq!(analyzer.analyze("   ", "Rust developer").unwrap().score, 0.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_backend_errors_propagate() {
        let result = analyzer(Arc::new(BrokenEmbedder)).analyze("Rust developer", "Rust developer");
        assert!(matches!(result, Err(CvMatchError::Embedding(_))));
    }
}
