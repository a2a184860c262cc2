//! Text embeddings: Model2Vec static embeddings or an offline hashing fallback

use crate::config::{Config, EmbeddingBackend};
use crate::error::{CvMatchError, Result};
use crate::processing::embedding_manager::EmbeddingModelManager;
use model2vec_rs::model::StaticModel;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// Turns texts into fixed-size vectors. Implementations are shared read-only
/// between analyzer tasks.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
}

impl StaticEmbedder {
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        log::info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl Embedder for StaticEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.encode(texts);
        if embeddings.len() != texts.len() {
            return Err(CvMatchError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }
}

/// Signed feature hashing of lowercased words, l2-normalized.
///
/// Needs no model files, so tests and offline runs use it.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(CvMatchError::Configuration(
                "Hashing embedder needs at least one dimension".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text.unicode_words() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();

            let index = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.encode_one(text)).collect())
    }
}

/// Build the embedder selected in the configuration, downloading the
/// Model2Vec model on first use.
pub async fn embedder_from_config(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.models.embedding_backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(config.models.hashing_dimensions)?)),
        EmbeddingBackend::Model2Vec => {
            let model_id = &config.models.default_embedding_model;
            let local_path = config.models_dir().join(model_id);

            let model_path = if local_path.exists() {
                local_path
            } else {
                let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
                let resolved = manager.resolve_model_id(model_id).ok_or_else(|| {
                    CvMatchError::ModelLoading(format!("Unknown embedding model: {}", model_id))
                })?;
                manager.ensure_model_available(&resolved).await?
            };

            Ok(Arc::new(StaticEmbedder::load(&model_path, model_id)?))
        }
    }
}

/// Group `.`-separated sentences into chunks of at most `word_budget` words.
/// A single sentence longer than the budget becomes its own chunk.
pub fn split_into_chunks(text: &str, word_budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_words = 0;

    for sentence in text.split('.').map(str::trim).filter(|s| !s.is_empty()) {
        let words = sentence.unicode_words().count();
        if !current.is_empty() && current_words + words > word_budget {
            chunks.push(current.join(". "));
            current.clear();
            current_words = 0;
        }
        current.push(sentence);
        current_words += words;
    }

    if !current.is_empty() {
        chunks.push(current.join(". "));
    }
    chunks
}

/// Mean of the chunk embeddings of `text`, or `None` when there is nothing to embed
pub fn document_embedding(embedder: &dyn Embedder, text: &str, word_budget: usize) -> Result<Option<Vec<f32>>> {
    let chunks = split_into_chunks(text, word_budget);
    if chunks.is_empty() {
        return Ok(None);
    }

    let embeddings = embedder.encode(&chunks)?;
    Ok(Some(mean_pool(&embeddings)?))
}

pub fn mean_pool(embeddings: &[Vec<f32>]) -> Result<Vec<f32>> {
    let Some(first) = embeddings.first() else {
        return Ok(Vec::new());
    };

    let mut pooled = vec![0.0f32; first.len()];
    for embedding in embeddings {
        if embedding.len() != pooled.len() {
            return Err(CvMatchError::Embedding(format!(
                "Embedding dimensions don't match: {} vs {}",
                embedding.len(),
                pooled.len()
            )));
        }
        for (acc, value) in pooled.iter_mut().zip(embedding) {
            *acc += value;
        }
    }

    let count = embeddings.len() as f32;
    pooled.iter_mut().for_each(|x| *x /= count);
    Ok(pooled)
}

/// Calculate cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(CvMatchError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let texts = vec!["Rust systems programming".to_string(), "rust SYSTEMS programming".to_string()];
        let embeddings = embedder.encode(&texts).unwrap();

        assert_eq!(embeddings[0].len(), 64);
        assert_eq!(embeddings[0], embeddings[1]);
        let norm: f32 = embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_embedder_rejects_zero_dimensions() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_split_into_chunks_respects_budget() {
        let text = "one two three. four five. six seven eight nine. ten";
        let chunks = split_into_chunks(text, 5);
        assert_eq!(chunks, vec!["one two three. four five", "six seven eight nine. ten"]);
    }

    #[test]
    fn test_oversized_sentence_is_own_chunk() {
        let chunks = split_into_chunks("a b c d e f. g", 3);
        assert_eq!(chunks, vec!["a b c d e f", "g"]);
    }

    #[test]
    fn test_document_embedding_of_empty_text() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(document_embedding(&embedder, " . . ", 512).unwrap().is_none());
    }

    #[test]
    fn test_mean_pool_dimension_mismatch() {
        let result = mean_pool(&[vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(result, Err(CvMatchError::Embedding(_))));
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &a).unwrap(), 1.0);
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&a, &[1.0]).is_err());
    }
}
