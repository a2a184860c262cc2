//! Registry and downloader for Model2Vec embedding models

use crate::error::{CvMatchError, Result};
use hf_hub::api::tokio::Api;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub dimensions: u32,
}

/// Tracks which known models are present under the models directory and
/// fetches missing ones from the HuggingFace Hub.
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: BTreeSet<String>,
}

const PREFERRED_MODELS: [&str; 3] = ["potion-base-8M", "m2v-base", "m2v-large"];

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                CvMatchError::ModelLoading(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            available_models: Self::known_models(),
            downloaded_models: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    fn known_models() -> BTreeMap<String, EmbeddingModelInfo> {
        let models = [
            (
                "potion-base-8M",
                EmbeddingModelInfo {
                    name: "Potion Base 8M".to_string(),
                    repo_id: "minishlab/potion-base-8M".to_string(),
                    size_mb: 33,
                    description: "Distilled static embeddings, best quality for its size".to_string(),
                    dimensions: 256,
                },
            ),
            (
                "m2v-base",
                EmbeddingModelInfo {
                    name: "Model2Vec Base".to_string(),
                    repo_id: "minishlab/M2V_base_output".to_string(),
                    size_mb: 90,
                    description: "Original Model2Vec base model".to_string(),
                    dimensions: 256,
                },
            ),
            (
                "m2v-large",
                EmbeddingModelInfo {
                    name: "Model2Vec Large".to_string(),
                    repo_id: "minishlab/M2V_large_output".to_string(),
                    size_mb: 250,
                    description: "Larger Model2Vec model for higher accuracy".to_string(),
                    dimensions: 512,
                },
            ),
        ];

        models.into_iter().map(|(id, info)| (id.to_string(), info)).collect()
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            CvMatchError::ModelLoading(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let model_info = self
            .available_models
            .get(model_id)
            .ok_or_else(|| CvMatchError::ModelLoading(format!("Unknown embedding model: {}", model_id)))?;

        let model_dir = self.models_dir.join(model_id);
        if self.downloaded_models.contains(model_id) {
            return Ok(model_dir);
        }

        log::info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name,
            model_info.size_mb,
            model_info.repo_id
        );

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| CvMatchError::ModelLoading(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for (file, required) in [
            ("model.safetensors", true),
            ("tokenizer.json", true),
            ("config.json", false),
        ] {
            match repo.get(file).await {
                Ok(cached_path) => {
                    fs::copy(&cached_path, model_dir.join(file)).await?;
                    log::debug!("Downloaded {}", file);
                }
                Err(e) if !required => log::warn!("Optional file {} not found: {}", file, e),
                Err(e) => {
                    return Err(CvMatchError::ModelLoading(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )))
                }
            }
        }

        self.downloaded_models.insert(model_id.to_string());
        log::info!("Embedding model {} is ready", model_info.name);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded_models
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    /// Get or download a model, returning its path
    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_model_path(model_id) {
            return Ok(path);
        }
        self.download_model(model_id).await
    }

    pub fn list_available_models(&self) -> Vec<(&str, &EmbeddingModelInfo)> {
        self.available_models
            .iter()
            .map(|(id, info)| (id.as_str(), info))
            .collect()
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Downloaded model in preference order, else the recommended default
    pub fn auto_select_model(&self) -> String {
        PREFERRED_MODELS
            .iter()
            .find(|id| self.downloaded_models.contains(**id))
            .unwrap_or(&PREFERRED_MODELS[0])
            .to_string()
    }

    /// Resolve a model ID from an ID, a HuggingFace repo id or a display name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|(_, info)| info.repo_id == input || info.name.to_lowercase() == input_lower)
            .map(|(id, _)| id.clone())
    }
}

/// A model directory holds the safetensors weights and the tokenizer
async fn is_model_directory(path: &Path) -> bool {
    fs::metadata(path.join("model.safetensors")).await.is_ok()
        && fs::metadata(path.join("tokenizer.json")).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_embedding_model_manager_creation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().join("models")).await.unwrap();

        assert_eq!(manager.list_available_models().len(), 3);
        assert!(!manager.is_model_downloaded("potion-base-8M"));
        assert!(temp_dir.path().join("models").exists());
    }

    #[tokio::test]
    async fn test_auto_select_model() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        assert_eq!(manager.auto_select_model(), "potion-base-8M");
    }

    #[tokio::test]
    async fn test_scan_finds_downloaded_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("m2v-base");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("model.safetensors"), b"").unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), b"{}").unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        assert!(manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.auto_select_model(), "m2v-base");
        assert_eq!(manager.get_model_path("m2v-base"), Some(model_dir));
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("minishlab/potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("Potion Base 8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("unknown"), None);
    }
}
