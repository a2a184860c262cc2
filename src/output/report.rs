//! Aggregate report produced by the analysis engine

use crate::analyzers::{AnalysisDetails, AnalyzerKind};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Combined result of every analyzer for one CV / job pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Weighted score of the successful analyzers (0.0 to 1.0)
    pub total_score: f32,

    /// `total_score` as a percentage
    pub match_percentage: f32,

    pub overall_analysis: OverallAnalysis,

    /// Per-analyzer results, successful analyzers only
    pub detailed_analysis: BTreeMap<AnalyzerKind, AnalyzerReport>,

    pub metadata: ReportMetadata,

    /// Set only when no analyzer completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub matched_items: Vec<String>,
    pub missing_items: Vec<String>,
    pub suggestions: BTreeMap<SuggestionCategory, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerReport {
    pub score: f32,
    pub analysis: AnalyzerFindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerFindings {
    pub matched_items: Vec<String>,
    pub missing_items: Vec<String>,
    pub specific_details: AnalysisDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Every configured analyzer, in fixed order
    pub analyzers_used: Vec<AnalyzerKind>,
    pub analyzer_weights: BTreeMap<AnalyzerKind, f32>,
    pub successful_analyzers: Vec<AnalyzerKind>,
    pub failed_analyzers: Vec<FailedAnalyzer>,
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAnalyzer {
    pub name: AnalyzerKind,
    pub error: String,
}

/// Buckets for pooled suggestions, declared in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Skills,
    Content,
    Format,
    Keywords,
    Other,
}

impl SuggestionCategory {
    const RULES: [(SuggestionCategory, &'static [&'static str]); 4] = [
        (SuggestionCategory::Skills, &["skill", "technology", "tool"]),
        (SuggestionCategory::Content, &["add", "expand", "include"]),
        (SuggestionCategory::Format, &["format", "structure", "organize"]),
        (SuggestionCategory::Keywords, &["keyword", "term", "phrase"]),
    ];

    /// First category whose trigger words occur in the suggestion
    pub fn classify(suggestion: &str) -> Self {
        let lowered = suggestion.to_lowercase();
        Self::RULES
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| lowered.contains(t)))
            .map(|(category, _)| *category)
            .unwrap_or(SuggestionCategory::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Skills => "skills",
            SuggestionCategory::Content => "content",
            SuggestionCategory::Format => "format",
            SuggestionCategory::Keywords => "keywords",
            SuggestionCategory::Other => "other",
        }
    }
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AggregateReport {
    pub fn score_for(&self, kind: AnalyzerKind) -> Option<f32> {
        self.detailed_analysis.get(&kind).map(|report| report.score)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_first_rule_wins() {
        assert_eq!(
            SuggestionCategory::classify("Consider adding these missing skills: rust"),
            SuggestionCategory::Skills
        );
        assert_eq!(
            SuggestionCategory::classify("Consider expanding these sections"),
            SuggestionCategory::Content
        );
        assert_eq!(
            SuggestionCategory::classify("Reorganize the document structure"),
            SuggestionCategory::Format
        );
        assert_eq!(
            SuggestionCategory::classify("Consider mentioning these topics: london"),
            SuggestionCategory::Other
        );
    }

    #[test]
    fn test_categories_serialize_lowercase() {
        let mut suggestions = BTreeMap::new();
        suggestions.insert(SuggestionCategory::Keywords, vec!["x".to_string()]);
        let json = serde_json::to_string(&suggestions).unwrap();
        assert_eq!(json, r#"{"keywords":["x"]}"#);
    }
}
