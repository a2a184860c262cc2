//! Text preprocessing: cleaning, linguistic features, skill extraction and sectioning

use crate::config::ProcessingConfig;
use crate::error::{CvMatchError, Result};
use crate::processing::lexicon;
use crate::processing::linguistic::{Entity, EntityLabel, LinguisticBackend, RuleBasedBackend};
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

const SKILL_PATTERNS: &[&str] = &[
    r"experience (?:in|with) ([^.,;\n]+)",
    r"knowledge of ([^.,;\n]+)",
    r"familiarity with ([^.,;\n]+)",
    r"proficiency in ([^.,;\n]+)",
    r"skilled in ([^.,;\n]+)",
    r"expertise in ([^.,;\n]+)",
];

pub struct TextPreprocessor {
    backend: Arc<dyn LinguisticBackend>,
    skill_patterns: Vec<Regex>,
    list_separator: Regex,
    disallowed_chars: Regex,
    whitespace: Regex,
    sentence_boundary: Regex,
    tech_terms: AhoCorasick,
    sentences_per_section: usize,
}

/// Linguistic view of one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedText {
    pub raw_text: String,
    pub cleaned_text: String,
    /// Non-stopword, non-punctuation tokens in document order
    pub tokens: Vec<String>,
    /// Lemmas of `tokens`, same order
    pub lemmas: Vec<String>,
    pub entities: Vec<Entity>,
    pub noun_phrases: Vec<String>,
    pub keywords: BTreeSet<String>,
}

impl ProcessedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.entities.is_empty()
    }
}

impl TextPreprocessor {
    /// Preprocessor with the rule-based backend and default settings
    pub fn new() -> Result<Self> {
        Self::from_config(&crate::config::Config::default().processing)
    }

    pub fn from_config(config: &ProcessingConfig) -> Result<Self> {
        let backend = Arc::new(RuleBasedBackend::with_extra_products(&config.extra_tech_terms)?);
        Self::with_backend(backend, &config.extra_tech_terms, config.sentences_per_section)
    }

    pub fn with_backend(
        backend: Arc<dyn LinguisticBackend>,
        extra_tech_terms: &[String],
        sentences_per_section: usize,
    ) -> Result<Self> {
        if sentences_per_section == 0 {
            return Err(CvMatchError::Configuration(
                "sentences_per_section must be greater than zero".to_string(),
            ));
        }

        let skill_patterns = SKILL_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid skill pattern: {}", e)))?;

        let list_separator = Regex::new(r"\s+(?:and|or)\s+|\s*&\s*|\s+/\s+")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid list pattern: {}", e)))?;
        let disallowed_chars = Regex::new(r"[^a-z0-9\s+#./\-]")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid cleaning pattern: {}", e)))?;
        let whitespace = Regex::new(r"\s+")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid whitespace pattern: {}", e)))?;
        let sentence_boundary = Regex::new(r"\.(?:\s+|$)")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid sentence pattern: {}", e)))?;

        let mut terms: Vec<String> = lexicon::DEFAULT_TECH_TERMS.iter().map(|t| t.to_string()).collect();
        terms.extend(
            extra_tech_terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        let tech_terms = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&terms)
            .map_err(|e| CvMatchError::TextProcessing(format!("Failed to build tech term matcher: {}", e)))?;

        Ok(Self {
            backend,
            skill_patterns,
            list_separator,
            disallowed_chars,
            whitespace,
            sentence_boundary,
            tech_terms,
            sentences_per_section,
        })
    }

    /// Lowercase, drop characters outside `[a-z0-9\s+#./-]`, collapse whitespace
    pub fn clean_text(&self, text: &str) -> String {
        let lowered = normalize_unicode(text).to_lowercase();
        let stripped = self.disallowed_chars.replace_all(&lowered, "");
        self.whitespace.replace_all(&stripped, " ").trim().to_string()
    }

    /// Run the linguistic backend over the cleaned text and collect keywords
    pub fn process(&self, text: &str) -> ProcessedText {
        let cleaned_text = self.clean_text(text);
        if cleaned_text.is_empty() {
            return ProcessedText {
                raw_text: text.to_string(),
                ..Default::default()
            };
        }

        let doc = match self.backend.analyze(&cleaned_text) {
            Ok(doc) => doc,
            Err(e) => {
                log::debug!("{} backend could not process text: {}", self.backend.name(), e);
                return ProcessedText {
                    raw_text: text.to_string(),
                    cleaned_text,
                    ..Default::default()
                };
            }
        };

        let mut tokens = Vec::new();
        let mut lemmas = Vec::new();
        let mut keywords = BTreeSet::new();

        for token in doc.tokens.iter().filter(|t| !t.is_stop && !t.is_punct) {
            tokens.push(token.text.to_lowercase());
            lemmas.push(token.lemma.to_lowercase());
            if token.pos.is_content() && token.is_alpha {
                keywords.insert(token.lemma.to_lowercase());
            }
        }

        keywords.extend(doc.entities.iter().map(|e| e.text.to_lowercase()));
        keywords.extend(doc.noun_chunks.iter().map(|chunk| chunk.to_lowercase()));

        ProcessedText {
            raw_text: text.to_string(),
            cleaned_text,
            tokens,
            lemmas,
            entities: doc.entities,
            noun_phrases: doc.noun_chunks,
            keywords,
        }
    }

    /// Skill phrases introduced by "experience with", "knowledge of" and the
    /// like, named products/organizations/places, and noun phrases naming a
    /// technology.
    pub fn extract_skills_and_requirements(&self, text: &str) -> BTreeSet<String> {
        let mut skills = BTreeSet::new();
        if text.trim().is_empty() {
            return skills;
        }

        let lowered = text.to_lowercase();
        for pattern in &self.skill_patterns {
            for capture in pattern.captures_iter(&lowered) {
                let Some(phrase) = capture.get(1) else {
                    continue;
                };
                self.insert_skill(&mut skills, phrase.as_str());

                let items: Vec<&str> = self.list_separator.split(phrase.as_str()).collect();
                if items.len() > 1 {
                    for item in items {
                        self.insert_skill(&mut skills, item);
                    }
                }
            }
        }

        match self.backend.analyze(text) {
            Ok(doc) => {
                for entity in doc.entities.iter().filter(|e| {
                    matches!(e.label, EntityLabel::Product | EntityLabel::Org | EntityLabel::Gpe)
                }) {
                    self.insert_skill(&mut skills, &entity.text);
                }
                for chunk in doc.noun_chunks.iter().filter(|c| self.tech_terms.is_match(c.as_str())) {
                    self.insert_skill(&mut skills, chunk);
                }
            }
            Err(e) => log::debug!("Skipping entity-based skills: {}", e),
        }

        skills
    }

    fn insert_skill(&self, skills: &mut BTreeSet<String>, raw: &str) {
        let skill = self.clean_text(raw);
        if !skill.is_empty() {
            skills.insert(skill);
        }
    }

    /// Split cleaned text on periods that end a sentence, keeping "node.js" intact
    pub fn split_sentences(&self, cleaned: &str) -> Vec<String> {
        self.sentence_boundary
            .split(cleaned)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Cumulative sections: section k holds sentences `0..min(size * (k + 1), n)`
    pub fn build_sections(&self, cleaned: &str) -> Vec<String> {
        let sentences = self.split_sentences(cleaned);
        let size = self.sentences_per_section;

        (0..sentences.len())
            .step_by(size)
            .map(|start| sentences[..(start + size).min(sentences.len())].join(". "))
            .collect()
    }

    /// Clean a raw document and cut it into sections
    pub fn sections(&self, text: &str) -> Vec<String> {
        self.build_sections(&self.clean_text(text))
    }
}

/// Map typographic punctuation to its ASCII form
fn normalize_unicode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2026}' => '.',
            _ => c,
        })
        .collect()
}
