//! TF-IDF vectorization over a small batch of section texts
//!
//! Vectorizers are fitted per comparison: the corpus is always the sections of
//! one CV and one job description.

use ndarray::{Array2, ArrayView1};
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer<'a> {
    stop_words: &'a HashSet<String>,
    ngram_range: (usize, usize),
    max_features: Option<usize>,
    sublinear_tf: bool,
}

/// Fitted document-term matrix with its vocabulary (alphabetical column order)
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: Vec<String>,
    pub matrix: Array2<f64>,
}

impl<'a> TfidfVectorizer<'a> {
    pub fn new(stop_words: &'a HashSet<String>) -> Self {
        Self {
            stop_words,
            ngram_range: (1, 1),
            max_features: None,
            sublinear_tf: false,
        }
    }

    pub fn ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Keep only the most frequent terms across the corpus
    pub fn max_features(mut self, max: usize) -> Self {
        self.max_features = Some(max);
        self
    }

    /// Use `1 + ln(tf)` instead of raw counts
    pub fn sublinear_tf(mut self, enabled: bool) -> Self {
        self.sublinear_tf = enabled;
        self
    }

    /// Lowercased word n-grams of one document, stop words removed first
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let words: Vec<String> = doc
            .unicode_words()
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().count() > 1 && !self.stop_words.contains(w))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > words.len() {
                break;
            }
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Fit the vocabulary on `docs` and return their l2-normalized TF-IDF rows
    pub fn fit_transform(&self, docs: &[String]) -> TfidfMatrix {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|doc| self.analyze(doc)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
            for term in terms {
                *corpus_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_frequency.into_iter().collect();
        // Most frequent first, alphabetical among ties so truncation is deterministic
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(max) = self.max_features {
            ranked.truncate(max);
        }

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term.to_string()).collect();
        vocabulary.sort();
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut matrix = Array2::zeros((docs.len(), vocabulary.len()));
        for (row, terms) in analyzed.iter().enumerate() {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for term in terms {
                if let Some(&col) = index.get(term.as_str()) {
                    *counts.entry(col).or_insert(0) += 1;
                }
            }
            for (col, count) in counts {
                let tf = if self.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                matrix[[row, col]] = tf * idf[col];
            }

            let norm = matrix.row(row).dot(&matrix.row(row)).sqrt();
            if norm > 0.0 {
                matrix.row_mut(row).mapv_inplace(|x| x / norm);
            }
        }

        TfidfMatrix { vocabulary, matrix }
    }
}

impl TfidfMatrix {
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Highest weighted terms of one row, ties broken alphabetically
    pub fn top_terms(&self, row: usize, k: usize) -> Vec<String> {
        let mut weighted: Vec<(usize, f64)> = self
            .matrix
            .row(row)
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(|(col, &w)| (col, w))
            .collect();

        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        weighted
            .into_iter()
            .take(k)
            .map(|(col, _)| self.vocabulary[col].clone())
            .collect()
    }
}

/// Cosine similarity of two dense rows; zero when either row is all zeros
pub fn cosine(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(&b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::lexicon::english_stop_words;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_analyze_drops_stop_words_and_builds_bigrams() {
        let stop_words = english_stop_words();
        let vectorizer = TfidfVectorizer::new(&stop_words).ngram_range(1, 2);
        let terms = vectorizer.analyze("the rust compiler and the borrow checker");

        assert_eq!(
            terms,
            vec!["rust", "compiler", "borrow", "checker", "rust compiler", "compiler borrow", "borrow checker"]
        );
    }

    #[test]
    fn test_rows_are_normalized() {
        let stop_words = english_stop_words();
        let result = TfidfVectorizer::new(&stop_words)
            .sublinear_tf(true)
            .fit_transform(&docs(&["rust systems programming", "python data science programming"]));

        for row in result.matrix.rows() {
            assert!((row.dot(&row).sqrt() - 1.0).abs() < 1e-9);
        }
        assert_eq!(result.vocabulary, vec!["data", "programming", "python", "rust", "science", "systems"]);
    }

    #[test]
    fn test_shared_terms_weigh_less() {
        let stop_words = english_stop_words();
        let result = TfidfVectorizer::new(&stop_words)
            .fit_transform(&docs(&["rust programming", "python programming"]));

        let top = result.top_terms(0, 2);
        assert_eq!(top, vec!["rust", "programming"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let stop_words = english_stop_words();
        let result = TfidfVectorizer::new(&stop_words)
            .max_features(2)
            .fit_transform(&docs(&["rust rust rust go", "rust python python"]));

        assert_eq!(result.vocabulary, vec!["python", "rust"]);
    }

    #[test]
    fn test_empty_corpus_has_empty_vocabulary() {
        let stop_words = english_stop_words();
        let result = TfidfVectorizer::new(&stop_words).fit_transform(&docs(&["", "the and of"]));
        assert!(result.is_empty());
        assert_eq!(result.matrix.nrows(), 2);
    }

    #[test]
    fn test_cosine() {
        let a = ndarray::arr1(&[1.0, 0.0, 1.0]);
        let b = ndarray::arr1(&[1.0, 0.0, 1.0]);
        let zero = ndarray::arr1(&[0.0, 0.0, 0.0]);
        assert!((cosine(a.view(), b.view()) - 1.0).abs() < 1e-12);
        assert_eq!(cosine(a.view(), zero.view()), 0.0);
    }
}
