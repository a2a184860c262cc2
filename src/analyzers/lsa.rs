//! Latent semantic analysis: sections compared in a truncated SVD topic space

use super::{mean, preview, AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind};
use crate::error::Result;
use crate::processing::lexicon::english_stop_words;
use crate::processing::svd::{component_count, TruncatedSvd};
use crate::processing::text_processor::TextPreprocessor;
use crate::processing::tfidf::{cosine, TfidfVectorizer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Best CV counterpart of one job section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMatch {
    pub job_section: String,
    pub cv_section: String,
    pub similarity: f32,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LsaDetails {
    /// One entry per job section, in document order
    pub section_matches: Vec<SectionMatch>,
    pub matched_topics: Vec<String>,
    pub missing_topics: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct LsaAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
    stop_words: HashSet<String>,
    n_components: usize,
    max_features: usize,
    topic_terms: usize,
    low_threshold: f32,
}

impl LsaAnalyzer {
    pub fn new(
        preprocessor: Arc<TextPreprocessor>,
        n_components: usize,
        max_features: usize,
        topic_terms: usize,
        low_threshold: f32,
    ) -> Self {
        Self {
            preprocessor,
            stop_words: english_stop_words(),
            n_components,
            max_features,
            topic_terms,
            low_threshold,
        }
    }

    fn empty_result() -> AnalysisResult {
        AnalysisResult::new(0.0, AnalysisDetails::Lsa(LsaDetails::default()), Vec::new())
    }
}

/// Component with the largest absolute loading in a reduced row
fn dominant_component(reduced: &Array2<f64>, row: usize) -> usize {
    reduced
        .row(row)
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, value)| {
            if value.abs() > best.1 {
                (idx, value.abs())
            } else {
                best
            }
        })
        .0
}

impl Analyzer for LsaAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Lsa
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let cv_sections = self.preprocessor.sections(cv_text);
        let job_sections = self.preprocessor.sections(job_text);
        if cv_sections.is_empty() || job_sections.is_empty() {
            return Ok(Self::empty_result());
        }

        let n_cv = cv_sections.len();
        let corpus: Vec<String> = cv_sections.into_iter().chain(job_sections).collect();
        let tfidf = TfidfVectorizer::new(&self.stop_words)
            .ngram_range(1, 2)
            .max_features(self.max_features)
            .sublinear_tf(true)
            .fit_transform(&corpus);

        let k = component_count(self.n_components, tfidf.vocabulary.len());
        if k == 0 {
            log::debug!("Vocabulary of {} terms is too small for LSA", tfidf.vocabulary.len());
            return Ok(Self::empty_result());
        }

        let svd = TruncatedSvd::fit(&tfidf.matrix, k);
        let reduced = svd.reduced();

        let mut section_matches = Vec::new();
        let mut similarities = Vec::new();
        let mut matched_topics = BTreeSet::new();
        let mut missing_topics = BTreeSet::new();
        let mut suggestions = Vec::new();

        for row in n_cv..corpus.len() {
            let (best_cv, similarity) = (0..n_cv)
                .map(|cv_row| (cv_row, cosine(reduced.row(row), reduced.row(cv_row))))
                .fold((0, f64::NEG_INFINITY), |best, candidate| {
                    if candidate.1 > best.1 {
                        candidate
                    } else {
                        best
                    }
                });
            let similarity = similarity as f32;

            let topics: Vec<String> = svd
                .top_term_indices(dominant_component(&reduced, row), self.topic_terms)
                .into_iter()
                .map(|idx| tfidf.vocabulary[idx].clone())
                .collect();

            let section = format!("job_section_{}", row - n_cv);
            if similarity < self.low_threshold {
                suggestions.push(format!(
                    "Section {} could be improved by adding content related to: {}",
                    section,
                    topics.join(", ")
                ));
                missing_topics.extend(topics.iter().cloned());
            } else {
                matched_topics.extend(topics.iter().cloned());
            }

            similarities.push(similarity);
            section_matches.push(SectionMatch {
                job_section: section,
                cv_section: format!("cv_section_{}", best_cv),
                similarity,
                topics,
            });
        }

        let missing_topics: Vec<String> = missing_topics.into_iter().collect();
        if !missing_topics.is_empty() {
            suggestions.push(format!(
                "Consider incorporating these key concepts: {}",
                preview(&missing_topics, 5)
            ));
        }

        let matched_topics: Vec<String> = matched_topics.into_iter().collect();
        Ok(AnalysisResult::new(
            mean(&similarities),
            AnalysisDetails::Lsa(LsaDetails {
                section_matches,
                matched_topics: matched_topics.clone(),
                missing_topics,
                suggestions,
            }),
            matched_topics,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn analyzer(n_components: usize) -> LsaAnalyzer {
        LsaAnalyzer::new(Arc::new(TextPreprocessor::new().unwrap()), n_components, 10_000, 5, 0.5)
    }

    fn details(result: &AnalysisResult) -> &LsaDetails {
        match &result.details {
            AnalysisDetails::Lsa(details) => details,
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_dominant_component() {
        let reduced = arr2(&[[0.2, -0.9, 0.1], [0.5, 0.1, 0.0]]);
        assert_eq!(dominant_component(&reduced, 0), 1);
        assert_eq!(dominant_component(&reduced, 1), 0);
    }

    #[test]
    fn test_identical_documents() {
        let text = "Designed data pipelines with Spark and Airflow. Tuned warehouse queries in Snowflake.";
        let result = analyzer(100).analyze(text, text).unwrap();

        assert!((result.score - 1.0).abs() < 1e-5);
        let details = details(&result);
        assert!(details.missing_topics.is_empty());
        assert!(!details.matched_topics.is_empty());
        assert_eq!(details.section_matches[0].job_section, "job_section_0");
        assert_eq!(details.section_matches[0].cv_section, "cv_section_0");
    }

    #[test]
    fn test_single_term_vocabulary_is_clamped_to_zero() {
        let result = analyzer(100).analyze("rust", "rust").unwrap();
        assert_eq!(result.score, 0.0);
        assert!(details(&result).section_matches.is_empty());
    }

    #[test]
    fn test_disjoint_documents_report_missing_topics() {
        let result = analyzer(100)
            .analyze("Pastry chef baking sourdough bread.", "Kubernetes operator written in golang.")
            .unwrap();

        assert!(result.score.abs() < 1e-6);
        let details = details(&result);
        assert!(!details.missing_topics.is_empty());
        assert!(details.suggestions[0].starts_with("Section job_section_0 could be improved"));
        assert!(details
            .suggestions
            .last()
            .unwrap()
            .starts_with("Consider incorporating these key concepts: "));
    }

    #[test]
    fn test_large_cv_finishes_quickly() {
        let limit = crate::config::Config::default().processing.max_document_chars;
        let verbs = ["Built", "Migrated", "Scaled", "Designed", "Maintained", "Automated", "Profiled"];
        let areas = ["billing", "search", "ingestion", "reporting", "identity", "payments", "telemetry"];
        let tools = ["kafka", "spark", "postgres", "redis", "terraform", "airflow", "kubernetes", "grpc"];

        let mut cv = String::new();
        let mut i = 0;
        while cv.len() < limit - 500 {
            cv.push_str(&format!(
                "{} the {} platform {} with {} and {} for team {} in quarter {}. ",
                verbs[i % verbs.len()],
                areas[(i / 3) % areas.len()],
                i,
                tools[i % tools.len()],
                tools[(i / 5) % tools.len()],
                i % 41,
                i % 13
            ));
            i += 1;
        }
        let job = "We need an engineer for the payments platform. Experience with kafka and postgres. \
                   Terraform and kubernetes for deployment. Airflow pipelines for reporting.";

        let started = std::time::Instant::now();
        let result = analyzer(100).analyze(&cv, job).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(60), "took {:?}", started.elapsed());
        assert!(result.score > 0.0 && result.score <= 1.0 + 1e-6);
    }

    #[test]
    fn test_empty_job() {
        assert_eq!(analyzer(100).analyze("Rust developer", "").unwrap().score, 0.0);
    }
}
