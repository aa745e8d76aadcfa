//! Vector store trait for storing and searching indexed documents.

use async_trait::async_trait;

use crate::document::{IndexedDocument, SearchResult};
use crate::error::Result;

/// A storage backend for indexed documents with dot-product similarity search.
///
/// Implementations manage named collections of [`IndexedDocument`]s keyed by
/// document id.
///
/// # Example
///
/// ```rust,ignore
/// use docent_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("passages", 384).await?;
/// store.upsert("passages", &documents).await?;
/// let results = store.search("passages", &query_embedding, 4).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Whether a collection with this name exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Insert or replace documents, keyed by id.
    async fn upsert(&self, collection: &str, documents: &[IndexedDocument]) -> Result<()>;

    /// Search for the `top_k` documents with the highest dot product against
    /// `embedding`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
