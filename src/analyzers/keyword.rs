//! Keyword and skill overlap

use super::{AnalysisDetails, AnalysisResult, Analyzer, AnalyzerKind};
use crate::error::Result;
use crate::processing::text_processor::TextPreprocessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const SKILL_WEIGHT: f32 = 0.7;
const KEYWORD_WEIGHT: f32 = 0.3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDetails {
    pub matched_skills: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub missing_skills: Vec<String>,
    pub skill_score: f32,
    pub keyword_score: f32,
    pub suggestions: Vec<String>,
}

/// Scores the job's required skills and keywords found in the CV, with skills
/// weighted 0.7 and general keywords 0.3.
pub struct KeywordAnalyzer {
    preprocessor: Arc<TextPreprocessor>,
}

impl KeywordAnalyzer {
    pub fn new(preprocessor: Arc<TextPreprocessor>) -> Self {
        Self { preprocessor }
    }
}

impl Analyzer for KeywordAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Keyword
    }

    fn analyze(&self, cv_text: &str, job_text: &str) -> Result<AnalysisResult> {
        let cv = self.preprocessor.process(cv_text);
        let job = self.preprocessor.process(job_text);
        let job_skills = self.preprocessor.extract_skills_and_requirements(job_text);

        // A skill phrase written the same way in the CV counts even when it
        // is not a single keyword there
        let mut cv_side: BTreeSet<String> = cv.keywords.clone();
        cv_side.extend(self.preprocessor.extract_skills_and_requirements(cv_text));

        let matched_skills: Vec<String> = job_skills.intersection(&cv_side).cloned().collect();
        let missing_skills: Vec<String> = job_skills.difference(&cv_side).cloned().collect();
        let matched_keywords: Vec<String> = cv.keywords.intersection(&job.keywords).cloned().collect();

        let skill_score = ratio(matched_skills.len(), job_skills.len());
        let keyword_score = ratio(matched_keywords.len(), job.keywords.len());
        let score = SKILL_WEIGHT * skill_score + KEYWORD_WEIGHT * keyword_score;

        let mut suggestions = Vec::new();
        if !missing_skills.is_empty() {
            suggestions.push(format!(
                "Consider adding these missing skills: {}",
                missing_skills.join(", ")
            ));
        }

        let matched_items: Vec<String> = matched_skills
            .iter()
            .chain(matched_keywords.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(AnalysisResult::new(
            score,
            AnalysisDetails::Keyword(KeywordDetails {
                matched_skills,
                matched_keywords,
                missing_skills,
                skill_score,
                keyword_score,
                suggestions,
            }),
            matched_items,
        ))
    }
}

fn ratio(matched: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        matched as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> KeywordAnalyzer {
        KeywordAnalyzer::new(Arc::new(TextPreprocessor::new().unwrap()))
    }

    fn details(result: &AnalysisResult) -> &KeywordDetails {
        match &result.details {
            AnalysisDetails::Keyword(details) => details,
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_self_comparison_is_maximal() {
        let text = "Senior backend engineer with experience in Rust and PostgreSQL, knowledge of \
                    distributed systems. Deployed services on AWS with Docker and Kubernetes.";
        let result = analyzer().analyze(text, text).unwrap();

        assert!((result.score - 1.0).abs() < 1e-6);
        assert!(details(&result).missing_skills.is_empty());
        assert!(details(&result).suggestions.is_empty());
    }

    #[test]
    fn test_verbatim_skills_fully_matched() {
        let job = "We require experience with Kubernetes, knowledge of Terraform, familiarity with Go tooling.";
        let cv = "Platform engineer. I bring experience with Kubernetes, knowledge of Terraform, familiarity with Go tooling.";
        let result = analyzer().analyze(cv, job).unwrap();

        let details = details(&result);
        assert_eq!(details.skill_score, 1.0, "missing: {:?}", details.missing_skills);
        assert!(result.score >= SKILL_WEIGHT);
    }

    #[test]
    fn test_missing_skills_become_one_suggestion() {
        let job = "Must have experience with Python, proficiency in SQL.";
        let cv = "Frontend developer working in TypeScript.";
        let result = analyzer().analyze(cv, job).unwrap();

        let details = details(&result);
        assert!(details.missing_skills.contains(&"python".to_string()));
        assert!(details.missing_skills.contains(&"sql".to_string()));
        assert_eq!(details.suggestions.len(), 1);
        assert!(details.suggestions[0].starts_with("Consider adding these missing skills: "));
        assert!(result.score < 0.5);
    }

    #[test]
    fn test_empty_job_scores_zero() {
        let result = analyzer().analyze("Rust developer", "").unwrap();
        assert_eq!(result.score, 0.0);
        assert!(result.matched_items.is_empty());
    }
}
