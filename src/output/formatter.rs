//! Console and JSON rendering of aggregate reports

use crate::analyzers::{AnalysisDetails, AnalyzerKind};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::AggregateReport;
use colored::{Color, Colorize};

/// Trait for formatting aggregate reports
pub trait OutputFormatter {
    fn format_report(&self, report: &AggregateReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for structured output
pub struct JsonFormatter {
    pretty: bool,
}

const LIST_PREVIEW: usize = 10;

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, percentage: f32) -> String {
        let (badge, color) = match percentage.round() as u8 {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_list(&self, items: &[String], color: Color) -> String {
        let mut output = String::new();
        for item in items.iter().take(LIST_PREVIEW) {
            output.push_str(&format!("  • {}\n", self.colorize(item, color)));
        }
        if items.len() > LIST_PREVIEW {
            output.push_str(&format!("  … and {} more\n", items.len() - LIST_PREVIEW));
        }
        output
    }

    fn format_details(&self, details: &AnalysisDetails) -> String {
        let mut output = String::new();
        match details {
            AnalysisDetails::Keyword(d) => {
                output.push_str(&format!(
                    "    skill score {:.1}% | keyword score {:.1}%\n",
                    d.skill_score * 100.0,
                    d.keyword_score * 100.0
                ));
            }
            AnalysisDetails::Embedding(d) => {
                for entry in &d.section_similarities {
                    output.push_str(&format!("    {}: {:.3}\n", entry.section, entry.similarity));
                }
            }
            AnalysisDetails::Cosine(d) => {
                for entry in &d.section_similarities {
                    output.push_str(&format!("    {}: {:.3}\n", entry.section, entry.similarity));
                }
            }
            AnalysisDetails::Jaccard(d) => {
                let s = &d.similarities;
                output.push_str(&format!(
                    "    keywords {:.3} | tokens {:.3} | entities {:.3} | noun phrases {:.3}\n",
                    s.keyword_similarity, s.token_similarity, s.entity_similarity, s.noun_phrase_similarity
                ));
            }
            AnalysisDetails::Ner(d) => {
                for (entity_type, similarity) in &d.entity_similarities {
                    output.push_str(&format!("    {}: {:.3}\n", entity_type, similarity));
                }
            }
            AnalysisDetails::Lsa(d) => {
                for section_match in &d.section_matches {
                    output.push_str(&format!(
                        "    {} ~ {}: {:.3} [{}]\n",
                        section_match.job_section,
                        section_match.cv_section,
                        section_match.similarity,
                        section_match.topics.join(", ")
                    ));
                }
            }
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AggregateReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CV MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        if let Some(error) = &report.error {
            output.push_str(&format!("\n{}\n", self.colorize(error, Color::Red)));
        }

        output.push_str(&self.format_header("Overall Match", 2));
        output.push_str(&format!(
            "Match: {:.1}% {}\n",
            report.match_percentage,
            self.format_score_badge(report.match_percentage)
        ));

        output.push_str(&self.format_header("Score Breakdown", 3));
        for kind in &report.metadata.analyzers_used {
            let weight = report.metadata.analyzer_weights.get(kind).copied().unwrap_or(0.0);
            let score = match report.score_for(*kind) {
                Some(score) => format!("{:.1}%", score * 100.0),
                None => self.colorize("failed", Color::Red),
            };
            output.push_str(&format!("  {:<10} {} (weight: {:.0}%)\n", kind.as_str(), score, weight * 100.0));
        }
        for failure in &report.metadata.failed_analyzers {
            output.push_str(&format!(
                "  {} {}: {}\n",
                self.colorize("!", Color::Red),
                failure.name,
                failure.error
            ));
        }

        if !report.overall_analysis.matched_items.is_empty() {
            output.push_str(&self.format_header("Matched", 3));
            output.push_str(&self.format_list(&report.overall_analysis.matched_items, Color::Green));
        }

        if !report.overall_analysis.missing_items.is_empty() {
            output.push_str(&self.format_header("Missing", 3));
            output.push_str(&self.format_list(&report.overall_analysis.missing_items, Color::Yellow));
        }

        if !report.overall_analysis.suggestions.is_empty() {
            output.push_str(&self.format_header("Suggestions", 2));
            for (category, suggestions) in &report.overall_analysis.suggestions {
                output.push_str(&format!("{}\n", self.colorize(&category.to_string(), Color::Cyan)));
                for suggestion in suggestions {
                    output.push_str(&format!("  • {}\n", suggestion));
                }
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Analyzer Details", 2));
            for kind in AnalyzerKind::ALL {
                let Some(analyzer) = report.detailed_analysis.get(&kind) else {
                    continue;
                };
                output.push_str(&format!(
                    "  {} {:.1}%\n",
                    self.colorize(kind.as_str(), Color::Cyan),
                    analyzer.score * 100.0
                ));
                output.push_str(&self.format_details(&analyzer.analysis.specific_details));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AggregateReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Formatter for the requested output format
pub fn formatter_for(format: OutputFormat, use_colors: bool, detailed: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::KeywordDetails;
    use crate::output::report::{
        AnalyzerFindings, AnalyzerReport, FailedAnalyzer, OverallAnalysis, ReportMetadata, SuggestionCategory,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn sample_report() -> AggregateReport {
        let mut detailed_analysis = BTreeMap::new();
        detailed_analysis.insert(
            AnalyzerKind::Keyword,
            AnalyzerReport {
                score: 0.5,
                analysis: AnalyzerFindings {
                    matched_items: vec!["rust".to_string()],
                    missing_items: vec!["kafka".to_string()],
                    specific_details: AnalysisDetails::Keyword(KeywordDetails {
                        skill_score: 0.5,
                        keyword_score: 0.5,
                        ..Default::default()
                    }),
                },
            },
        );

        let mut suggestions = BTreeMap::new();
        suggestions.insert(
            SuggestionCategory::Skills,
            vec!["Consider adding these missing skills: kafka".to_string()],
        );

        AggregateReport {
            total_score: 0.5,
            match_percentage: 50.0,
            overall_analysis: OverallAnalysis {
                matched_items: vec!["rust".to_string()],
                missing_items: vec!["kafka".to_string()],
                suggestions,
            },
            detailed_analysis,
            metadata: ReportMetadata {
                analyzers_used: vec![AnalyzerKind::Keyword, AnalyzerKind::Embedding],
                analyzer_weights: [(AnalyzerKind::Keyword, 0.5), (AnalyzerKind::Embedding, 0.5)]
                    .into_iter()
                    .collect(),
                successful_analyzers: vec![AnalyzerKind::Keyword],
                failed_analyzers: vec![FailedAnalyzer {
                    name: AnalyzerKind::Embedding,
                    error: "model unavailable".to_string(),
                }],
                generated_at: Utc::now(),
                processing_time_ms: 12,
            },
            error: None,
        }
    }

    #[test]
    fn test_console_output_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();

        assert!(output.contains("Match: 50.0% [BELOW AVG]"));
        assert!(output.contains("embedding"));
        assert!(output.contains("model unavailable"));
        assert!(output.contains("Consider adding these missing skills: kafka"));
        assert!(output.contains("skill score 50.0%"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let report = sample_report();
        let json = JsonFormatter::new(false).format_report(&report).unwrap();
        assert_eq!(AggregateReport::from_json(&json).unwrap(), report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("error").is_none());
    }
}
