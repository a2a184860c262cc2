//! Linguistic analysis: tokens with part-of-speech tags and lemmas, named
//! entities and noun chunks.
//!
//! The preprocessor only talks to the [`LinguisticBackend`] trait. The bundled
//! [`RuleBasedBackend`] is deterministic and needs no model files: entities come
//! from gazetteers matched with Aho-Corasick plus date/number patterns, tags
//! come from closed word classes and suffix rules.

use crate::error::{CvMatchError, Result};
use crate::processing::lexicon;
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Named entity categories recognised by the backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Org,
    Gpe,
    Product,
    Cardinal,
    Date,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Cardinal => "CARDINAL",
            EntityLabel::Date => "DATE",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Propn,
    Adj,
    Verb,
    Adv,
    Aux,
    Num,
    Det,
    Pron,
    Adp,
    Cconj,
    Part,
    Punct,
    Sym,
}

impl PartOfSpeech {
    /// Tags whose lemmas count as content keywords
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::Propn | PartOfSpeech::Adj | PartOfSpeech::Verb
        )
    }

    fn is_nominal(&self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::Propn)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_punct: bool,
    pub is_alpha: bool,
    /// Byte offsets into the analyzed text
    pub start: usize,
    pub end: usize,
}

/// Output of one backend run
#[derive(Debug, Clone, Default)]
pub struct LinguisticDoc {
    pub tokens: Vec<Token>,
    pub entities: Vec<Entity>,
    pub noun_chunks: Vec<String>,
}

pub trait LinguisticBackend: Send + Sync {
    fn name(&self) -> &str;

    fn analyze(&self, text: &str) -> Result<LinguisticDoc>;
}

struct EntitySpan {
    start: usize,
    end: usize,
    label: EntityLabel,
    from_gazetteer: bool,
}

pub struct RuleBasedBackend {
    token_regex: Regex,
    date_regex: Regex,
    cardinal_regex: Regex,
    gazetteer: AhoCorasick,
    gazetteer_labels: Vec<EntityLabel>,
    stop_words: HashSet<String>,
    closed_classes: HashMap<String, PartOfSpeech>,
    verbs: HashSet<String>,
    verb_stems: HashSet<String>,
    nouns: HashSet<String>,
    no_lemma: HashSet<String>,
    irregular: HashMap<String, String>,
}

const ADJECTIVE_SUFFIXES: &[&str] = &["able", "ible", "ical", "ive", "ous", "ful", "less", "ic", "al"];

impl RuleBasedBackend {
    pub fn new() -> Result<Self> {
        Self::with_extra_products(&[])
    }

    /// Build the backend with additional PRODUCT gazetteer entries
    pub fn with_extra_products(extra_products: &[String]) -> Result<Self> {
        let token_regex = Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#]*(?:[./\-'’][\p{L}\p{N}+#]+)*|\S")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid token pattern: {}", e)))?;

        let date_regex = Regex::new(
            r"(?i)\b(?:(?:19|20)\d{2}\s*(?:-|to)\s*(?:(?:19|20)\d{2}|present|current|now)\b|(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(?:\d{1,2},?\s+)?(?:19|20)\d{2}\b|(?:\d+\+?|one|two|three|four|five|six|seven|eight|nine|ten)\s+(?:years?|months?|weeks?)\b|(?:19|20)\d{2}\b)",
        )
        .map_err(|e| CvMatchError::TextProcessing(format!("Invalid date pattern: {}", e)))?;

        let cardinal_regex = Regex::new(r"\b\d+(?:[.,]\d+)*\b")
            .map_err(|e| CvMatchError::TextProcessing(format!("Invalid number pattern: {}", e)))?;

        let mut entries: Vec<(String, EntityLabel)> = Vec::new();
        entries.extend(lexicon::TECH_PRODUCTS.iter().map(|t| (t.to_string(), EntityLabel::Product)));
        entries.extend(
            extra_products
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .map(|t| (t, EntityLabel::Product)),
        );
        entries.extend(lexicon::ORGANIZATIONS.iter().map(|t| (t.to_string(), EntityLabel::Org)));
        entries.extend(lexicon::LOCATIONS.iter().map(|t| (t.to_string(), EntityLabel::Gpe)));

        let patterns: Vec<&str> = entries.iter().map(|(term, _)| term.as_str()).collect();
        let gazetteer = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| CvMatchError::TextProcessing(format!("Failed to build entity gazetteer: {}", e)))?;
        let gazetteer_labels = entries.iter().map(|(_, label)| *label).collect();

        let mut closed_classes = HashMap::new();
        let classes: [(&[&str], PartOfSpeech); 9] = [
            (lexicon::NUMBER_WORDS, PartOfSpeech::Num),
            (lexicon::DETERMINERS, PartOfSpeech::Det),
            (lexicon::PRONOUNS, PartOfSpeech::Pron),
            (lexicon::AUXILIARIES, PartOfSpeech::Aux),
            (lexicon::CONJUNCTIONS, PartOfSpeech::Cconj),
            (lexicon::PARTICLES, PartOfSpeech::Part),
            (lexicon::PREPOSITIONS, PartOfSpeech::Adp),
            (lexicon::ADVERBS, PartOfSpeech::Adv),
            (lexicon::ADJECTIVES, PartOfSpeech::Adj),
        ];
        // Earlier classes win for words listed twice
        for (words, pos) in classes {
            for word in words {
                closed_classes.entry(word.to_string()).or_insert(pos);
            }
        }

        let verbs = lexicon::word_set(lexicon::VERBS);
        let mut verb_stems = verbs.clone();
        verb_stems.extend(lexicon::word_set(lexicon::NOUN_VERBS));

        let mut nouns = lexicon::word_set(lexicon::GERUND_NOUNS);
        nouns.extend(lexicon::word_set(lexicon::NOUN_EXCEPTIONS));
        nouns.extend(lexicon::word_set(lexicon::NOUN_VERBS));

        Ok(Self {
            token_regex,
            date_regex,
            cardinal_regex,
            gazetteer,
            gazetteer_labels,
            stop_words: lexicon::english_stop_words(),
            closed_classes,
            verbs,
            verb_stems,
            nouns,
            no_lemma: lexicon::word_set(lexicon::NO_LEMMA),
            irregular: lexicon::irregular_lemmas(),
        })
    }

    fn find_entities(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans: Vec<EntitySpan> = Vec::new();

        for mat in self.gazetteer.find_iter(text) {
            if is_word_boundary(text, mat.start(), mat.end()) {
                spans.push(EntitySpan {
                    start: mat.start(),
                    end: mat.end(),
                    label: self.gazetteer_labels[mat.pattern().as_usize()],
                    from_gazetteer: true,
                });
            }
        }

        let patterns = [(&self.date_regex, EntityLabel::Date), (&self.cardinal_regex, EntityLabel::Cardinal)];
        for (regex, label) in patterns {
            for mat in regex.find_iter(text) {
                let overlaps = spans.iter().any(|s| mat.start() < s.end && s.start < mat.end());
                if !overlaps {
                    spans.push(EntitySpan {
                        start: mat.start(),
                        end: mat.end(),
                        label,
                        from_gazetteer: false,
                    });
                }
            }
        }

        spans.sort_by_key(|s| s.start);
        spans
    }

    fn tag(&self, word: &str, in_named_entity: bool) -> PartOfSpeech {
        if !word.chars().any(|c| c.is_alphanumeric()) {
            return if word.chars().all(|c| "+#&/%$@*=<>~^|".contains(c)) {
                PartOfSpeech::Sym
            } else {
                PartOfSpeech::Punct
            };
        }
        if in_named_entity && word.chars().any(|c| c.is_alphabetic()) {
            return PartOfSpeech::Propn;
        }
        if !word.chars().any(|c| c.is_alphabetic()) {
            return PartOfSpeech::Num;
        }
        if let Some(pos) = self.closed_classes.get(word) {
            return *pos;
        }
        if self.nouns.contains(word) {
            return PartOfSpeech::Noun;
        }
        if self.verbs.contains(word) || self.known_verb_lemma(word).is_some() {
            return PartOfSpeech::Verb;
        }
        if self.irregular.get(word).is_some_and(|lemma| self.verb_stems.contains(lemma)) {
            return PartOfSpeech::Verb;
        }

        let len = word.chars().count();
        if len > 4 && word.ends_with("ly") {
            return PartOfSpeech::Adv;
        }
        if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
            return PartOfSpeech::Adj;
        }
        if (len > 5 && word.ends_with("ing")) || (len > 4 && word.ends_with("ed")) {
            return PartOfSpeech::Verb;
        }
        PartOfSpeech::Noun
    }

    /// Lemma of an inflected form of a verb from the lexicon, if any
    fn known_verb_lemma(&self, word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ied").or_else(|| word.strip_suffix("ies")) {
            let candidate = format!("{}y", stem);
            if self.verb_stems.contains(&candidate) {
                return Some(candidate);
            }
        }

        for suffix in ["ing", "ed", "es", "s"] {
            let Some(stem) = word.strip_suffix(suffix) else {
                continue;
            };
            if stem.len() < 2 {
                continue;
            }
            let candidates = [stem.to_string(), format!("{}e", stem), undouble(stem)];
            if let Some(found) = candidates.into_iter().find(|c| self.verb_stems.contains(c)) {
                return Some(found);
            }
        }
        None
    }

    fn verb_lemma(&self, word: &str) -> String {
        if self.verb_stems.contains(word) {
            return word.to_string();
        }
        if let Some(lemma) = self.known_verb_lemma(word) {
            return lemma;
        }

        let stem = word
            .strip_suffix("ing")
            .or_else(|| word.strip_suffix("ed"))
            .filter(|stem| stem.len() > 2);
        match stem {
            Some(stem) => {
                let undoubled = undouble(stem);
                if undoubled != stem {
                    undoubled
                } else if lexicon::SILENT_E_STEMS.iter().any(|ending| stem.ends_with(ending)) {
                    format!("{}e", stem)
                } else {
                    stem.to_string()
                }
            }
            None => word.to_string(),
        }
    }

    fn noun_lemma(&self, word: &str) -> String {
        if self.no_lemma.contains(word) || word.chars().count() <= 3 {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() > 1 {
                return format!("{}y", stem);
            }
        }
        for suffix in ["sses", "xes", "ches", "shes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is") {
            return word[..word.len() - 1].to_string();
        }
        word.to_string()
    }

    fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        if let Some(lemma) = self.irregular.get(word) {
            return lemma.clone();
        }
        match pos {
            PartOfSpeech::Noun => self.noun_lemma(word),
            PartOfSpeech::Verb => self.verb_lemma(word),
            _ => word.to_string(),
        }
    }

    /// Maximal runs of adjectives, numbers and nouns that end in a noun
    fn noun_chunks(&self, text: &str, tokens: &[Token]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut run: Vec<&Token> = Vec::new();

        for token in tokens {
            let in_chunk = !token.is_stop
                && matches!(
                    token.pos,
                    PartOfSpeech::Adj | PartOfSpeech::Num | PartOfSpeech::Noun | PartOfSpeech::Propn
                );
            if in_chunk {
                run.push(token);
            } else {
                flush_chunk(text, &mut run, &mut chunks);
            }
        }
        flush_chunk(text, &mut run, &mut chunks);

        chunks
    }
}

impl LinguisticBackend for RuleBasedBackend {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn analyze(&self, text: &str) -> Result<LinguisticDoc> {
        let spans = self.find_entities(text);

        let tokens: Vec<Token> = self
            .token_regex
            .find_iter(text)
            .map(|mat| {
                let surface = mat.as_str();
                let lower = surface.to_lowercase();
                let in_named_entity = spans
                    .iter()
                    .any(|s| s.from_gazetteer && s.start <= mat.start() && mat.end() <= s.end);
                let pos = self.tag(&lower, in_named_entity);
                let lemma = self.lemmatize(&lower, pos);

                Token {
                    text: surface.to_string(),
                    lemma,
                    pos,
                    is_stop: self.stop_words.contains(&lower),
                    is_punct: !surface.chars().any(|c| c.is_alphanumeric()),
                    is_alpha: surface.chars().all(|c| c.is_alphabetic()),
                    start: mat.start(),
                    end: mat.end(),
                }
            })
            .collect();

        let entities = spans
            .iter()
            .map(|s| Entity {
                text: text[s.start..s.end].to_string(),
                label: s.label,
            })
            .collect();

        let noun_chunks = self.noun_chunks(text, &tokens);

        Ok(LinguisticDoc {
            tokens,
            entities,
            noun_chunks,
        })
    }
}

fn flush_chunk(text: &str, run: &mut Vec<&Token>, chunks: &mut Vec<String>) {
    while run.last().is_some_and(|t| !t.pos.is_nominal()) {
        run.pop();
    }
    if let (Some(first), Some(last)) = (run.first(), run.last()) {
        chunks.push(text[first.start..last.end].to_string());
    }
    run.clear();
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

/// "runn" -> "run", leaving "ll", "ss" and "zz" alone
fn undouble(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    if let [.., a, b] = chars.as_slice() {
        if a == b && !"aeiouylsz".contains(*a) {
            return chars[..chars.len() - 1].iter().collect();
        }
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RuleBasedBackend {
        RuleBasedBackend::new().unwrap()
    }

    fn token<'a>(doc: &'a LinguisticDoc, text: &str) -> &'a Token {
        doc.tokens.iter().find(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_gazetteer_entities() {
        let doc = backend()
            .analyze("Senior engineer at Google in London using Python, Kubernetes and node.js")
            .unwrap();

        let found: Vec<(String, EntityLabel)> =
            doc.entities.iter().map(|e| (e.text.to_lowercase(), e.label)).collect();
        assert!(found.contains(&("google".to_string(), EntityLabel::Org)));
        assert!(found.contains(&("london".to_string(), EntityLabel::Gpe)));
        assert!(found.contains(&("python".to_string(), EntityLabel::Product)));
        assert!(found.contains(&("kubernetes".to_string(), EntityLabel::Product)));
        assert!(found.contains(&("node.js".to_string(), EntityLabel::Product)));
    }

    #[test]
    fn test_entities_respect_word_boundaries() {
        let doc = backend().analyze("metadata pipelines for the duke").unwrap();
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn test_dates_and_cardinals() {
        let doc = backend()
            .analyze("5 years of experience since March 2019, leading 12 engineers")
            .unwrap();

        let dates: Vec<&str> = doc
            .entities
            .iter()
            .filter(|e| e.label == EntityLabel::Date)
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(dates, vec!["5 years", "March 2019"]);

        let cardinals: Vec<&str> = doc
            .entities
            .iter()
            .filter(|e| e.label == EntityLabel::Cardinal)
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(cardinals, vec!["12"]);
    }

    #[test]
    fn test_tags_and_lemmas() {
        let doc = backend()
            .analyze("we built scalable services and managed distributed databases.")
            .unwrap();

        assert_eq!(token(&doc, "built").lemma, "build");
        assert_eq!(token(&doc, "built").pos, PartOfSpeech::Verb);
        assert_eq!(token(&doc, "managed").lemma, "manage");
        assert_eq!(token(&doc, "services").lemma, "service");
        assert_eq!(token(&doc, "services").pos, PartOfSpeech::Noun);
        assert_eq!(token(&doc, "scalable").pos, PartOfSpeech::Adj);
        assert_eq!(token(&doc, "databases").lemma, "database");
        assert!(token(&doc, "we").is_stop);
        assert!(token(&doc, ".").is_punct);
    }

    #[test]
    fn test_noun_chunks() {
        let doc = backend()
            .analyze("we built scalable services and managed distributed databases")
            .unwrap();
        assert_eq!(doc.noun_chunks, vec!["scalable services", "distributed databases"]);
    }

    #[test]
    fn test_extra_products() {
        let backend = RuleBasedBackend::with_extra_products(&["Pulumi".to_string()]).unwrap();
        let doc = backend.analyze("infrastructure with pulumi").unwrap();
        assert_eq!(doc.entities[0].label, EntityLabel::Product);
    }

    #[test]
    fn test_undouble() {
        assert_eq!(undouble("runn"), "run");
        assert_eq!(undouble("call"), "call");
        assert_eq!(undouble("build"), "build");
    }
}
