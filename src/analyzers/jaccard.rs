//! Set overlap of keywords, tokens, entities and noun phrases

use super::{jaccard_index, preview, AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind};
use crate::error::Result;
use crate::processing::text_processor::{ProcessedText, TextPreprocessor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const KEYWORD_WEIGHT: f32 = 0.4;
const TOKEN_WEIGHT: f32 = 0.2;
const ENTITY_WEIGHT: f32 = 0.2;
const NOUN_PHRASE_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JaccardSimilarities {
    pub keyword_similarity: f32,
    pub token_similarity: f32,
    pub entity_similarity: f32,
    pub noun_phrase_similarity: f32,
}

impl JaccardSimilarities {
    pub fn weighted(&self) -> f32 {
        KEYWORD_WEIGHT * self.keyword_similarity
            + TOKEN_WEIGHT * self.token_similarity
            + ENTITY_WEIGHT * self.entity_similarity
            + NOUN_PHRASE_WEIGHT * self.noun_phrase_similarity
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JaccardDetails {
    pub similarities: JaccardSimilarities,
    pub missing_keywords: Vec<String>,
    pub missing_entities: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct JaccardAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
}

struct FeatureSets {
    keywords: BTreeSet<String>,
    tokens: BTreeSet<String>,
    entities: BTreeSet<String>,
    noun_phrases: BTreeSet<String>,
}

impl FeatureSets {
    fn from_processed(processed: ProcessedText) -> Self {
        Self {
            keywords: processed.keywords,
            tokens: processed.tokens.into_iter().collect(),
            entities: processed.entities.into_iter().map(|e| e.text.to_lowercase()).collect(),
            noun_phrases: processed.noun_phrases.into_iter().collect(),
        }
    }
}

impl JaccardAnalyzer {
    pub fn new(preprocessor: Arc<TextPreprocessor>) -> Self {
        Self { preprocessor }
    }

    /// The four coefficients; each is symmetric in its arguments
    pub fn similarities(&self, cv_text: &str, job_text: &str) -> JaccardSimilarities {
        let cv = FeatureSets::from_processed(self.preprocessor.process(cv_text));
        let job = FeatureSets::from_processed(self.preprocessor.process(job_text));
        compare(&cv, &job)
    }
}

fn compare(cv: &FeatureSets, job: &FeatureSets) -> JaccardSimilarities {
    JaccardSimilarities {
        keyword_similarity: jaccard_index(&cv.keywords, &job.keywords),
        token_similarity: jaccard_index(&cv.tokens, &job.tokens),
        entity_similarity: jaccard_index(&cv.entities, &job.entities),
        noun_phrase_similarity: jaccard_index(&cv.noun_phrases, &job.noun_phrases),
    }
}

impl Analyzer for JaccardAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Jaccard
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let cv = FeatureSets::from_processed(self.preprocessor.process(cv_text));
        let job = FeatureSets::from_processed(self.preprocessor.process(job_text));
        let similarities = compare(&cv, &job);

        let missing_keywords: Vec<String> = job.keywords.difference(&cv.keywords).cloned().collect();
        let missing_entities: Vec<String> = job.entities.difference(&cv.entities).cloned().collect();

        let mut suggestions = Vec::new();
        if !missing_keywords.is_empty() {
            suggestions.push(format!(
                "Consider adding these keywords: {}",
                preview(&missing_keywords, 5)
            ));
        }
        if !missing_entities.is_empty() {
            suggestions.push(format!(
                "Consider mentioning these topics: {}",
                preview(&missing_entities, 5)
            ));
        }

        let matched: BTreeSet<String> = cv
            .keywords
            .intersection(&job.keywords)
            .chain(cv.entities.intersection(&job.entities))
            .cloned()
            .collect();

        Ok(AnalysisResult::new(
            similarities.weighted(),
            AnalysisDetails::Jaccard(JaccardDetails {
                similarities,
                missing_keywords,
                missing_entities,
                suggestions,
            }),
            matched.into_iter().collect(),
        ))
    }
}
