//! Indexing pipeline: passages → embeddings → vector store.
//!
//! Every run is a full rebuild. The target collection is dropped if it
//! exists and recreated with the embedding provider's dimensionality, so
//! re-indexing the same corpus always leaves exactly one document per
//! passage. A failure part-way through aborts the run and leaves the
//! documents upserted so far in place; there is no rollback.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::document::{IndexedDocument, Passage};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Builds a collection from a corpus of [`Passage`]s.
///
/// # Example
///
/// ```rust,ignore
/// use docent_rag::{IndexingPipeline, InMemoryVectorStore, RagConfig};
///
/// let indexer = IndexingPipeline::new(
///     RagConfig::default(),
///     Arc::new(embedder),
///     Arc::new(InMemoryVectorStore::new()),
///     "passages",
/// );
/// let count = indexer.index(&passages).await?;
/// ```
pub struct IndexingPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl IndexingPipeline {
    /// Create an indexing pipeline writing into `collection`.
    pub fn new(
        config: RagConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { config, embedding_provider, vector_store, collection: collection.into() }
    }

    /// The collection this pipeline writes into.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Rebuild the collection from `passages` and return the number of
    /// documents indexed.
    ///
    /// # Errors
    ///
    /// - [`RagError::DuplicatePassage`] if two passages share an id; checked
    ///   before any provider call.
    /// - [`RagError::PipelineError`] if recreating the collection, embedding
    ///   or upserting fails (after retries), or if the embedding provider
    ///   returns the wrong number or size of vectors.
    pub async fn index(&self, passages: &[Passage]) -> Result<usize> {
        let mut seen = HashSet::with_capacity(passages.len());
        if let Some(duplicate) = passages.iter().find(|p| !seen.insert(p.id)) {
            return Err(RagError::DuplicatePassage(duplicate.id));
        }

        self.recreate_collection().await?;

        let mut indexed = 0;
        for batch in passages.chunks(self.config.batch_size.max(1)) {
            indexed += self.index_batch(batch).await?;
            debug!(collection = %self.collection, indexed, total = passages.len(), "indexed batch");
        }

        info!(collection = %self.collection, indexed, "index rebuilt");
        Ok(indexed)
    }

    async fn recreate_collection(&self) -> Result<()> {
        let name = self.collection.as_str();
        let dimensions = self.embedding_provider.dimensions();
        let retry = &self.config.retry;

        let exists = retry
            .run("collection_exists", || self.vector_store.collection_exists(name))
            .await
            .map_err(|e| Self::collection_failure(name, "inspect", e))?;
        if exists {
            info!(collection = name, "dropping existing collection before rebuild");
            retry
                .run("delete_collection", || self.vector_store.delete_collection(name))
                .await
                .map_err(|e| Self::collection_failure(name, "delete", e))?;
        }

        retry
            .run("create_collection", || self.vector_store.create_collection(name, dimensions))
            .await
            .map_err(|e| Self::collection_failure(name, "create", e))
    }

    async fn index_batch(&self, batch: &[Passage]) -> Result<usize> {
        let contents: Vec<String> = batch.iter().map(Passage::content).collect();
        let texts: Vec<&str> = contents.iter().map(String::as_str).collect();
        let span = passage_span(batch);

        let vectors = self
            .config
            .retry
            .run("embed_batch", || self.embedding_provider.embed_batch(&texts))
            .await
            .map_err(|e| {
                error!(passages = %span, error = %e, "embedding failed during indexing");
                RagError::PipelineError(format!("embedding failed for passages {span}: {e}"))
            })?;

        if vectors.len() != batch.len() {
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} passages ({span})",
                vectors.len(),
                batch.len()
            )));
        }
        let dimensions = self.embedding_provider.dimensions();
        if let Some((passage, vector)) =
            batch.iter().zip(&vectors).find(|(_, v)| v.len() != dimensions)
        {
            return Err(RagError::PipelineError(format!(
                "embedding for passage {} has {} dimensions, expected {dimensions}",
                passage.id,
                vector.len()
            )));
        }

        let documents: Vec<IndexedDocument> = batch
            .iter()
            .zip(vectors)
            .map(|(passage, vector)| IndexedDocument::from_passage(passage, vector))
            .collect();

        self.config
            .retry
            .run("upsert", || self.vector_store.upsert(&self.collection, &documents))
            .await
            .map_err(|e| {
                error!(passages = %span, error = %e, "upsert failed during indexing");
                RagError::PipelineError(format!("upsert failed for passages {span}: {e}"))
            })?;

        Ok(documents.len())
    }

    fn collection_failure(name: &str, action: &str, e: RagError) -> RagError {
        error!(collection = name, error = %e, "failed to {} collection", action);
        RagError::PipelineError(format!("failed to {action} collection '{name}': {e}"))
    }
}

/// Human-readable id range of a batch, e.g. `[3..7]`.
fn passage_span(batch: &[Passage]) -> String {
    match (batch.first(), batch.last()) {
        (Some(first), Some(last)) if first.id != last.id => format!("[{}..{}]", first.id, last.id),
        (Some(first), _) => format!("[{}]", first.id),
        _ => "[]".to_string(),
    }
}
