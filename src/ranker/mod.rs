//! Semantic deduplication: embed each candidate's name + docstring +
//! signature, cluster pairs above a cosine-similarity threshold, keep the
//! earliest-ordered candidate of each cluster. Provider failures degrade to
//! a no-op for the affected candidates, never an aborted run.

pub mod embedder;

pub use embedder::{EmbedderError, EmbeddingProvider, FastembedProvider};

use std::sync::Arc;

use crate::config::RankerConfig;
use crate::models::{SchemaDescriptor, ToolCandidate};

pub struct SemanticRanker {
    provider: Arc<dyn EmbeddingProvider>,
    similarity_threshold: f32,
    batch_size: usize,
}

impl SemanticRanker {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        config: &RankerConfig,
        batch_size: usize,
    ) -> Self {
        Self {
            provider,
            similarity_threshold: config.similarity_threshold,
            batch_size: batch_size.max(1),
        }
    }

    /// Deduplicate the ordered candidate list. Candidates from failed
    /// embedding batches keep their position, unclustered.
    pub async fn dedup(
        &self,
        items: Vec<(ToolCandidate, SchemaDescriptor)>,
        notes: &mut Vec<String>,
    ) -> Vec<(ToolCandidate, SchemaDescriptor)> {
        if items.len() < 2 {
            return items;
        }

        let texts: Vec<String> = items.iter().map(|(c, _)| c.embedding_text()).collect();
        let embeddings = self.embed_batched(texts, notes).await;

        let n = items.len();
        let mut merged_into: Vec<Option<usize>> = vec![None; n];
        for i in 0..n {
            if merged_into[i].is_some() {
                continue;
            }
            let Some(a) = &embeddings[i] else { continue };
            for j in (i + 1)..n {
                if merged_into[j].is_some() {
                    continue;
                }
                let Some(b) = &embeddings[j] else { continue };
                if cosine_similarity(a, b) > self.similarity_threshold {
                    merged_into[j] = Some(i);
                }
            }
        }

        // Fold duplicates into their cluster head, earliest first.
        let mut out: Vec<Option<(ToolCandidate, SchemaDescriptor)>> =
            items.into_iter().map(Some).collect();
        for j in 0..n {
            let Some(i) = merged_into[j] else { continue };
            let (dup, _schema) = out[j].take().expect("duplicate taken once");
            let (kept, _) = out[i].as_mut().expect("cluster head present");
            tracing::debug!("Merging duplicate {} into {}", dup.key(), kept.key());
            kept.merged.push(dup.key());
            kept.merged.extend(dup.merged);
            for hint in dup.syscall_hints {
                if !kept.syscall_hints.contains(&hint) {
                    kept.syscall_hints.push(hint);
                }
            }
            if kept.docstring.is_none() {
                kept.docstring = dup.docstring;
            }
        }

        out.into_iter().flatten().collect()
    }

    /// Embed all texts in batches. Each failed batch leaves `None` for its
    /// candidates and records one note; other batches proceed.
    async fn embed_batched(
        &self,
        texts: Vec<String>,
        notes: &mut Vec<String>,
    ) -> Vec<Option<Vec<f32>>> {
        let total = texts.len();
        let batches: Vec<Vec<String>> = texts
            .chunks(self.batch_size)
            .map(|c| c.to_vec())
            .collect();
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();

        let futures = batches
            .into_iter()
            .map(|batch| self.provider.embed(batch));
        let results = futures::future::join_all(futures).await;

        let mut embeddings = Vec::with_capacity(total);
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(vectors) => embeddings.extend(vectors.into_iter().map(Some)),
                Err(e) => {
                    tracing::warn!("Embedding batch {} failed: {}", idx, e);
                    notes.push(format!(
                        "embedding batch {} failed, affected candidates left unclustered: {}",
                        idx, e
                    ));
                    embeddings.extend(std::iter::repeat_with(|| None).take(sizes[idx]));
                }
            }
        }
        // A misbehaving provider returning short batches must not panic the
        // clustering pass below.
        embeddings.resize_with(total.max(embeddings.len()), || None);
        embeddings
    }
}

/// Cosine similarity of two equal-length vectors; 0 for degenerate inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

// =============================================================================
// Unit Tests
// =============================================================================
