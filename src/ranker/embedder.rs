//! Embedding provider seam. The fastembed-backed implementation owns the
//! model as a lazily-initialized shared resource: one writer initializes it,
//! afterwards it is read-only behind an Arc. Absence of the model degrades
//! ranking, never extraction.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::EmbeddingConfig;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EmbedderError>;

/// External embedding collaborator: text batch in, fixed-length vectors out.
/// May fail per batch with a provider-level error.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Fixed dimensionality of returned vectors.
    #[allow(dead_code)]
    fn dimension(&self) -> usize;
}

/// fastembed-backed provider with lazy model initialization.
pub struct FastembedProvider {
    config: EmbeddingConfig,
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
    dimension: usize,
}

impl FastembedProvider {
    pub fn new(config: EmbeddingConfig) -> Self {
        let dimension = match config.model.as_str() {
            "BGEBaseENV15" | "bge-base-en-v1.5" => 768,
            _ => 384, // AllMiniLML6V2, BGESmallENV15
        };
        Self {
            config,
            model: OnceCell::new(),
            dimension,
        }
    }

    fn model_kind(&self) -> EmbeddingModel {
        match self.config.model.as_str() {
            "BGESmallENV15" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "BGEBaseENV15" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "AllMiniLML6V2" | "all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
            other => {
                tracing::warn!("Unknown embedding model '{}', using AllMiniLML6V2", other);
                EmbeddingModel::AllMiniLML6V2
            }
        }
    }

    /// Get the shared model handle, initializing it on first use. Concurrent
    /// callers wait on the single initializer; a failed init is returned as
    /// a provider error and may be retried by a later call.
    async fn shared_model(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        let kind = self.model_kind();
        let cache_dir = self
            .config
            .cache_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join("fastembed")
            });

        self.model
            .get_or_try_init(|| async move {
                tracing::info!("Initializing embedding model {:?}", kind);
                let model = tokio::task::spawn_blocking(move || {
                    std::fs::create_dir_all(&cache_dir).ok();
                    TextEmbedding::try_new(
                        InitOptions::new(kind)
                            .with_cache_dir(cache_dir)
                            .with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| EmbedderError::Embedding(anyhow::anyhow!("join error: {}", e)))?
                .map_err(EmbedderError::Embedding)?;
                Ok::<_, EmbedderError>(Arc::new(Mutex::new(model)))
            })
            .await
            .cloned()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastembedProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.shared_model().await?;

        // CPU-bound embedding runs on the blocking pool, off the runtime.
        tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|e| EmbedderError::Embedding(anyhow::anyhow!("mutex poisoned: {}", e)))?;
            guard.embed(texts, None).map_err(EmbedderError::Embedding)
        })
        .await
        .map_err(|e| EmbedderError::Embedding(anyhow::anyhow!("join error: {}", e)))?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_by_model() {
        let small = FastembedProvider::new(EmbeddingConfig::default());
        assert_eq!(small.dimension(), 384);

        let base = FastembedProvider::new(EmbeddingConfig {
            model: "BGEBaseENV15".to_string(),
            ..EmbeddingConfig::default()
        });
        assert_eq!(base.dimension(), 768);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let provider = FastembedProvider::new(EmbeddingConfig {
            model: "NoSuchModel".to_string(),
            ..EmbeddingConfig::default()
        });
        assert!(matches!(
            provider.model_kind(),
            EmbeddingModel::AllMiniLML6V2
        ));
        assert_eq!(provider.dimension(), 384);
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        // Must not touch (or initialize) the model at all.
        let provider = FastembedProvider::new(EmbeddingConfig::default());
        let out = provider.embed(Vec::new()).await.unwrap();
        assert!(out.is_empty());
        assert!(provider.model.get().is_none());
    }
}
