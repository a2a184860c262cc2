//! Analysis engine running every analyzer concurrently and fusing the results

use crate::analyzers::{
    AnalysisResult, Analyzer, AnalyzerKind, CosineAnalyzer, EmbeddingAnalyzer, EntityAnalyzer, JaccardAnalyzer,
    KeywordAnalyzer, LsaAnalyzer,
};
use crate::config::{Config, WEIGHT_TOLERANCE};
use crate::error::{CvMatchError, Result};
use crate::output::report::{
    AggregateReport, AnalyzerFindings, AnalyzerReport, FailedAnalyzer, OverallAnalysis, ReportMetadata,
    SuggestionCategory,
};
use crate::processing::embeddings::{embedder_from_config, Embedder};
use crate::processing::text_processor::TextPreprocessor;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const NO_ANALYZER_SUCCEEDED: &str = "No analyzers completed successfully";

struct WeightedAnalyzer {
    analyzer: Arc<dyn Analyzer>,
    weight: f32,
}

/// Coordinates the analyzers: fan-out on the blocking pool, fan-in into one report
pub struct AnalysisEngine {
    /// Sorted by analyzer kind
    analyzers: Vec<WeightedAnalyzer>,
    max_parallel_analyzers: usize,
    max_document_chars: usize,
}

pub struct AnalysisEngineBuilder {
    analyzers: Vec<WeightedAnalyzer>,
    max_parallel_analyzers: usize,
    max_document_chars: usize,
}

impl AnalysisEngineBuilder {
    pub fn new() -> Self {
        let defaults = Config::default().processing;
        Self {
            analyzers: Vec::new(),
            max_parallel_analyzers: defaults.max_parallel_analyzers,
            max_document_chars: defaults.max_document_chars,
        }
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn Analyzer>, weight: f32) -> Self {
        self.analyzers.push(WeightedAnalyzer { analyzer, weight });
        self
    }

    pub fn max_parallel_analyzers(mut self, max: usize) -> Self {
        self.max_parallel_analyzers = max;
        self
    }

    pub fn max_document_chars(mut self, max: usize) -> Self {
        self.max_document_chars = max;
        self
    }

    /// Validate the weights and fix the analyzer order
    pub fn build(mut self) -> Result<AnalysisEngine> {
        if self.analyzers.is_empty() {
            return Err(CvMatchError::Configuration("At least one analyzer is required".to_string()));
        }
        if self.max_parallel_analyzers == 0 {
            return Err(CvMatchError::Configuration(
                "max_parallel_analyzers must be greater than zero".to_string(),
            ));
        }

        self.analyzers.sort_by_key(|entry| entry.analyzer.kind());
        for pair in self.analyzers.windows(2) {
            if pair[0].analyzer.kind() == pair[1].analyzer.kind() {
                return Err(CvMatchError::Configuration(format!(
                    "Analyzer '{}' registered twice",
                    pair[0].analyzer.kind()
                )));
            }
        }

        if let Some(entry) = self.analyzers.iter().find(|e| !e.weight.is_finite() || e.weight < 0.0) {
            return Err(CvMatchError::Configuration(format!(
                "Weight for analyzer '{}' must be a non-negative number",
                entry.analyzer.kind()
            )));
        }
        let sum: f32 = self.analyzers.iter().map(|entry| entry.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CvMatchError::Configuration(format!(
                "Analyzer weights must sum to 1.0, got {:.4}",
                sum
            )));
        }

        Ok(AnalysisEngine {
            analyzers: self.analyzers,
            max_parallel_analyzers: self.max_parallel_analyzers,
            max_document_chars: self.max_document_chars,
        })
    }
}

impl Default for AnalysisEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    pub fn builder() -> AnalysisEngineBuilder {
        AnalysisEngineBuilder::new()
    }

    /// Create the engine with the embedding backend selected in the configuration
    pub async fn new(config: &Config) -> Result<Self> {
        let embedder = embedder_from_config(config).await?;
        Self::from_config(config, embedder)
    }

    /// All six analyzers sharing one preprocessor and the given embedder
    pub fn from_config(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;

        let preprocessor = Arc::new(TextPreprocessor::from_config(&config.processing)?);
        let scoring = &config.scoring;
        let weights = &scoring.weights;

        AnalyzerKind::ALL
            .into_iter()
            .fold(Self::builder(), |builder, kind| {
                let analyzer: Arc<dyn Analyzer> = match kind {
                    AnalyzerKind::Keyword => Arc::new(KeywordAnalyzer::new(preprocessor.clone())),
                    AnalyzerKind::Embedding => Arc::new(EmbeddingAnalyzer::new(
                        preprocessor.clone(),
                        embedder.clone(),
                        config.processing.chunk_word_budget,
                        scoring.embedding_high_threshold,
                        scoring.embedding_low_threshold,
                    )),
                    AnalyzerKind::Cosine => Arc::new(CosineAnalyzer::new(
                        preprocessor.clone(),
                        scoring.cosine_low_threshold,
                        scoring.top_terms,
                    )),
                    AnalyzerKind::Jaccard => Arc::new(JaccardAnalyzer::new(preprocessor.clone())),
                    AnalyzerKind::Ner => Arc::new(EntityAnalyzer::new(preprocessor.clone())),
                    AnalyzerKind::Lsa => Arc::new(LsaAnalyzer::new(
                        preprocessor.clone(),
                        scoring.lsa_components,
                        scoring.lsa_max_features,
                        scoring.topic_terms,
                        scoring.lsa_low_threshold,
                    )),
                };
                builder.analyzer(analyzer, weights.get(kind))
            })
            .max_parallel_analyzers(config.processing.max_parallel_analyzers)
            .max_document_chars(config.processing.max_document_chars)
            .build()
    }

    pub fn analyzer_kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|entry| entry.analyzer.kind()).collect()
    }

    pub fn weights(&self) -> BTreeMap<AnalyzerKind, f32> {
        self.analyzers
            .iter()
            .map(|entry| (entry.analyzer.kind(), entry.weight))
            .collect()
    }

    fn validate_input(&self, label: &str, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(CvMatchError::InvalidInput(format!("{} text is empty", label)));
        }
        let chars = text.chars().count();
        if chars > self.max_document_chars {
            return Err(CvMatchError::InvalidInput(format!(
                "{} text has {} characters, the limit is {}",
                label, chars, self.max_document_chars
            )));
        }
        Ok(())
    }

    /// Score a CV against a job description.
    ///
    /// Every analyzer runs to completion; a failing or panicking analyzer is
    /// recorded in the metadata and the remaining weights are renormalized.
    /// Only blank or oversized documents are rejected with an error.
    pub async fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AggregateReport> {
        self.validate_input("CV", cv_text)?;
        self.validate_input("Job description", job_text)?;

        let start_time = Instant::now();
        log::info!("Running {} analyzers", self.analyzers.len());

        let mut outcomes = self.run_analyzers(cv_text, job_text).await;

        let mut weighted_sum = 0.0f32;
        let mut weight_total = 0.0f32;
        let mut matched_items = BTreeSet::new();
        let mut missing_items = BTreeSet::new();
        let mut suggestions = Vec::new();
        let mut detailed_analysis = BTreeMap::new();
        let mut successful_analyzers = Vec::new();
        let mut failed_analyzers = Vec::new();

        for entry in &self.analyzers {
            let kind = entry.analyzer.kind();
            let outcome = outcomes
                .remove(&kind)
                .unwrap_or_else(|| Err(CvMatchError::Processing("analyzer task did not complete".to_string())));

            match outcome {
                Ok(result) => {
                    let score = normalize_score(result.score);
                    weighted_sum += score * entry.weight;
                    weight_total += entry.weight;

                    let missing = result.details.missing_items();
                    matched_items.extend(result.matched_items.iter().cloned());
                    missing_items.extend(missing.iter().cloned());
                    suggestions.extend(result.details.suggestions().iter().cloned());

                    detailed_analysis.insert(
                        kind,
                        AnalyzerReport {
                            score,
                            analysis: AnalyzerFindings {
                                matched_items: result.matched_items,
                                missing_items: missing,
                                specific_details: result.details,
                            },
                        },
                    );
                    successful_analyzers.push(kind);
                }
                Err(e) => {
                    log::warn!("Analyzer '{}' failed: {}", kind, e);
                    failed_analyzers.push(FailedAnalyzer {
                        name: kind,
                        error: e.to_string(),
                    });
                }
            }
        }

        let (total_score, error) = if successful_analyzers.is_empty() {
            log::warn!("{}", NO_ANALYZER_SUCCEEDED);
            (0.0, Some(NO_ANALYZER_SUCCEEDED.to_string()))
        } else if weight_total > 0.0 {
            (normalize_score(weighted_sum / weight_total), None)
        } else {
            (0.0, None)
        };

        let processing_time = start_time.elapsed();
        log::info!(
            "Analysis completed in {:.2?} with score {:.1}% ({} of {} analyzers succeeded)",
            processing_time,
            total_score * 100.0,
            successful_analyzers.len(),
            self.analyzers.len()
        );

        Ok(AggregateReport {
            total_score,
            match_percentage: total_score * 100.0,
            overall_analysis: OverallAnalysis {
                matched_items: matched_items.into_iter().collect(),
                missing_items: missing_items.into_iter().collect(),
                suggestions: categorize_suggestions(&suggestions),
            },
            detailed_analysis,
            metadata: ReportMetadata {
                analyzers_used: self.analyzer_kinds(),
                analyzer_weights: self.weights(),
                successful_analyzers,
                failed_analyzers,
                generated_at: chrono::Utc::now(),
                processing_time_ms: processing_time.as_millis() as u64,
            },
            error,
        })
    }

    /// Fan out on the blocking pool, bounded by the semaphore, and wait for every task
    async fn run_analyzers(&self, cv_text: &str, job_text: &str) -> HashMap<AnalyzerKind, Result<AnalysisResult>> {
        let cv: Arc<str> = Arc::from(cv_text);
        let job: Arc<str> = Arc::from(job_text);
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_analyzers));
        let mut tasks = JoinSet::new();

        for entry in &self.analyzers {
            let analyzer = Arc::clone(&entry.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let cv = Arc::clone(&cv);
            let job = Arc::clone(&job);

            tasks.spawn(async move {
                let kind = analyzer.kind();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (kind, Err(CvMatchError::Processing(e.to_string()))),
                };

                let started = Instant::now();
                let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&cv, &job))
                    .await
                    .unwrap_or_else(|e| {
                        let reason = if e.is_panic() { "analyzer panicked" } else { "analyzer was cancelled" };
                        Err(CvMatchError::AnalysisFailed(reason.to_string()))
                    });

                log::debug!("Analyzer '{}' finished in {:.2?}", kind, started.elapsed());
                (kind, outcome)
            });
        }

        let mut outcomes = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, outcome)) => {
                    outcomes.insert(kind, outcome);
                }
                Err(e) => log::error!("Analyzer task failed to join: {}", e),
            }
        }
        outcomes
    }
}

/// Scores are reported on a common [0, 1] scale
fn normalize_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Bucket suggestions by their first matching category, dropping duplicates
pub fn categorize_suggestions(suggestions: &[String]) -> BTreeMap<SuggestionCategory, Vec<String>> {
    let mut categorized: BTreeMap<SuggestionCategory, Vec<String>> = BTreeMap::new();
    for suggestion in suggestions {
        let bucket = categorized.entry(SuggestionCategory::classify(suggestion)).or_default();
        if !bucket.contains(suggestion) {
            bucket.push(suggestion.clone());
        }
    }
    categorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{AnalysisDetails, KeywordDetails};
    use crate::processing::embeddings::HashingEmbedder;

    struct FixedAnalyzer {
        kind: AnalyzerKind,
        score: f32,
    }

    impl Analyzer for FixedAnalyzer {
        fn kind(&self) -> AnalyzerKind {
            self.kind
        }

        fn analyze(&self, _cv_text: &str, _job_text: &str) -> Result<AnalysisResult> {
            Ok(AnalysisResult::new(
                self.score,
                AnalysisDetails::Keyword(KeywordDetails {
                    missing_skills: vec!["kafka".to_string()],
                    suggestions: vec!["Consider adding these missing skills: kafka".to_string()],
                    ..Default::default()
                }),
                vec!["rust".to_string()],
            ))
        }
    }

    struct PanickingAnalyzer;

    impl Analyzer for PanickingAnalyzer {
        fn kind(&self) -> AnalyzerKind {
            AnalyzerKind::Lsa
        }

        fn analyze(&self, _cv_text: &str, _job_text: &str) -> Result<AnalysisResult> {
            panic!("boom")
        }
    }

    fn fixed(kind: AnalyzerKind, score: f32) -> Arc<dyn Analyzer> {
        Arc::new(FixedAnalyzer { kind, score })
    }

    #[test]
    fn test_categorize_suggestions() {
        let suggestions: Vec<String> = [
            "Consider adding these missing skills: go",
            "Consider adding these missing skills: go",
            "Consider expanding these sections to better match the job requirements: section_0",
            "Consider mentioning these topics: london",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let categorized = categorize_suggestions(&suggestions);
        assert_eq!(categorized[&SuggestionCategory::Skills].len(), 1);
        assert_eq!(categorized[&SuggestionCategory::Content].len(), 1);
        assert_eq!(categorized[&SuggestionCategory::Other].len(), 1);
        assert!(!categorized.contains_key(&SuggestionCategory::Format));
        assert!(!categorized.contains_key(&SuggestionCategory::Keywords));
    }

    #[test]
    fn test_builder_rejects_bad_weights() {
        let result = AnalysisEngine::builder()
            .analyzer(fixed(AnalyzerKind::Keyword, 1.0), 0.5)
            .analyzer(fixed(AnalyzerKind::Cosine, 1.0), 0.4)
            .build();
        assert!(matches!(result, Err(CvMatchError::Configuration(_))));

        let duplicate = AnalysisEngine::builder()
            .analyzer(fixed(AnalyzerKind::Keyword, 1.0), 0.5)
            .analyzer(fixed(AnalyzerKind::Keyword, 1.0), 0.5)
            .build();
        assert!(matches!(duplicate, Err(CvMatchError::Configuration(_))));

        assert!(AnalysisEngine::builder().build().is_err());
    }

    #[test]
    fn test_from_config_registers_all_analyzers() {
        let config = Config::default();
        let engine = AnalysisEngine::from_config(&config, Arc::new(HashingEmbedder::new(64).unwrap())).unwrap();

        assert_eq!(engine.analyzer_kinds(), AnalyzerKind::ALL.to_vec());
        assert!((engine.weights()[&AnalyzerKind::Lsa] - 0.1).abs() < 1e-6);
        for kind in AnalyzerKind::ALL {
            assert_eq!(engine.weights()[&kind], config.scoring.weights.get(kind));
        }
    }

    #[tokio::test]
    async fn test_scores_are_clamped() {
        let engine = AnalysisEngine::builder()
            .analyzer(fixed(AnalyzerKind::Keyword, 1.7), 0.5)
            .analyzer(fixed(AnalyzerKind::Cosine, -0.3), 0.5)
            .build()
            .unwrap();

        let report = engine.analyze("cv", "job").await.unwrap();
        assert_eq!(report.score_for(AnalyzerKind::Keyword), Some(1.0));
        assert_eq!(report.score_for(AnalyzerKind::Cosine), Some(0.0));
        assert!((report.total_score - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_panicking_analyzer_is_recorded_as_failure() {
        let engine = AnalysisEngine::builder()
            .analyzer(fixed(AnalyzerKind::Keyword, 0.6), 0.5)
            .analyzer(Arc::new(PanickingAnalyzer), 0.5)
            .build()
            .unwrap();

        let report = engine.analyze("cv", "job").await.unwrap();
        assert!((report.total_score - 0.6).abs() < 1e-6);
        assert_eq!(report.metadata.successful_analyzers, vec![AnalyzerKind::Keyword]);
        assert_eq!(report.metadata.failed_analyzers.len(), 1);
        assert_eq!(report.metadata.failed_analyzers[0].name, AnalyzerKind::Lsa);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_total_failure_sets_error() {
        let engine = AnalysisEngine::builder()
            .analyzer(Arc::new(PanickingAnalyzer), 1.0)
            .build()
            .unwrap();

        let report = engine.analyze("cv", "job").await.unwrap();
        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.error.as_deref(), Some(NO_ANALYZER_SUCCEEDED));
        assert!(report.detailed_analysis.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_and_oversized_documents() {
        let engine = AnalysisEngine::builder()
            .analyzer(fixed(AnalyzerKind::Keyword, 1.0), 1.0)
            .max_document_chars(10)
            .build()
            .unwrap();

        assert!(matches!(engine.analyze("  \n", "job").await, Err(CvMatchError::InvalidInput(_))));
        assert!(matches!(
            engine.analyze("cv", "a job description that is too long").await,
            Err(CvMatchError::InvalidInput(_))
        ));
    }
}
