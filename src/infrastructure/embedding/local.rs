use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Names accepted for `embedding.model`.
const SUPPORTED_MODELS: &[(&str, EmbeddingModel)] = &[
    ("all-MiniLM-L6-v2", EmbeddingModel::AllMiniLML6V2),
    ("all-MiniLM-L12-v2", EmbeddingModel::AllMiniLML12V2),
    ("bge-small-en-v1.5", EmbeddingModel::BGESmallENV15),
    ("multilingual-e5-large", EmbeddingModel::MultilingualE5Large),
];

fn resolve_model(name: &str) -> Result<EmbeddingModel, DomainError> {
    SUPPORTED_MODELS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, model)| model.clone())
        .ok_or_else(|| {
            let known: Vec<&str> = SUPPORTED_MODELS.iter().map(|(known, _)| *known).collect();
            DomainError::validation(format!(
                "unknown embedding model '{name}', expected one of: {}",
                known.join(", ")
            ))
        })
}

/// Sentence embeddings computed in-process with a fastembed model
/// (all-MiniLM-L6-v2 unless configured otherwise).
///
/// Weights are loaded on first use, from the cache directory or by
/// downloading them, and reused afterwards. A failed load is not cached.
pub struct LocalEmbedding {
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
    kind: EmbeddingModel,
    dimension: usize,
    cache_dir: Option<std::path::PathBuf>,
    show_download_progress: bool,
}

impl LocalEmbedding {
    /// Fails on a model name outside [`SUPPORTED_MODELS`].
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        let kind = resolve_model(&config.model)?;
        let dimension = TextEmbedding::get_model_info(&kind)
            .map_err(|e| DomainError::embedding(format!("no model info for {}: {e}", config.model)))?
            .dim;

        Ok(Self {
            model: OnceCell::new(),
            kind,
            dimension,
            cache_dir: config.cache_dir.clone(),
            show_download_progress: config.show_download_progress,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>, DomainError> {
        self.model
            .get_or_try_init(|| async {
                let mut options = InitOptions::new(self.kind.clone())
                    .with_show_download_progress(self.show_download_progress);
                if let Some(dir) = &self.cache_dir {
                    options = options.with_cache_dir(dir.clone());
                }

                tracing::info!(model = ?self.kind, "loading sentence embedding model");
                let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
                    .await
                    .map_err(|e| DomainError::embedding(format!("model loader crashed: {e}")))?
                    .map_err(|e| DomainError::embedding(format!("failed to load model: {e}")))?;

                Ok(Arc::new(Mutex::new(model)))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbedding {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let expected = owned.len();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| DomainError::internal(e.to_string()))?;
            model
                .embed(owned, None)
                .map_err(|e| DomainError::embedding(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::embedding(format!("encoder crashed: {e}")))??;

        if vectors.len() != expected {
            return Err(DomainError::embedding(format!(
                "expected {expected} embeddings, got {}",
                vectors.len()
            )));
        }

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
