//! Query pipeline orchestrator.
//!
//! The [`QueryPipeline`] answers a question end-to-end by composing an
//! [`EmbeddingProvider`], a [`VectorStore`] and a [`LanguageModel`]:
//! embed the question, retrieve the top-k documents, stuff them into a
//! [`PromptTemplate`] and generate the answer.
//!
//! # Example
//!
//! ```rust,ignore
//! use docent_rag::{InMemoryVectorStore, QueryPipeline, RagConfig};
//!
//! let pipeline = QueryPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .language_model(Arc::new(my_llm))
//!     .collection("passages")
//!     .build()?;
//!
//! pipeline.indexing_pipeline().index(&passages).await?;
//! let response = pipeline.answer("What is the capital of France?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::document::{QueryResponse, SearchResult, SourceDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::indexing::IndexingPipeline;
use crate::llm::LanguageModel;
use crate::prompt::PromptTemplate;
use crate::vectorstore::VectorStore;

/// The query pipeline.
///
/// Holds no mutable state; share it behind an `Arc` across concurrent
/// requests. Construct one via [`QueryPipeline::builder()`].
pub struct QueryPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    language_model: Arc<dyn LanguageModel>,
    collection: String,
    template: PromptTemplate,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The collection queries are answered from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// An [`IndexingPipeline`] sharing this pipeline's embedding provider,
    /// vector store and collection, so documents and queries are always
    /// embedded in the same space.
    pub fn indexing_pipeline(&self) -> IndexingPipeline {
        IndexingPipeline::new(
            self.config.clone(),
            Arc::clone(&self.embedding_provider),
            Arc::clone(&self.vector_store),
            self.collection.clone(),
        )
    }

    /// Answer `query` using the configured `top_k`.
    ///
    /// # Errors
    ///
    /// See [`answer_with_k`](QueryPipeline::answer_with_k).
    pub async fn answer(&self, query: &str) -> Result<QueryResponse> {
        self.answer_with_k(query, self.config.top_k).await
    }

    /// Answer `query` from the `k` most similar documents.
    ///
    /// An empty retrieval is not an error: the answer is generated from an
    /// empty context and `source_documents` is empty. A retrieval that times
    /// out, or a collection that has never been indexed, is treated the
    /// same way.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidQuery`] if `query` is blank or `k == 0`; no
    ///   provider is called.
    /// - [`RagError::PipelineError`] if embedding, search or generation fails.
    pub async fn answer_with_k(&self, query: &str, k: usize) -> Result<QueryResponse> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidQuery("query must not be empty".to_string()));
        }
        if k == 0 {
            return Err(RagError::InvalidQuery("k must be greater than zero".to_string()));
        }

        // 1. Embed the query
        let query_embedding = self
            .config
            .retry
            .run("embed_query", || self.embedding_provider.embed(query))
            .await
            .map_err(|e| {
                error!(error = %e, "embedding failed during query");
                RagError::PipelineError(format!("query embedding failed: {e}"))
            })?;

        // 2. Retrieve
        let results = self.retrieve(&query_embedding, k).await?;
        if results.is_empty() {
            warn!(collection = %self.collection, "no documents retrieved, answering from empty context");
        }

        // 3. Stuff the prompt and generate
        let prompt = self.template.render(&results, query);
        let result = self
            .config
            .retry
            .run("generate", || self.language_model.generate(&prompt, &self.config.generation))
            .await
            .map_err(|e| {
                error!(model = self.language_model.name(), error = %e, "generation failed");
                RagError::PipelineError(format!("answer generation failed: {e}"))
            })?;

        info!(k, retrieved = results.len(), "query answered");

        Ok(QueryResponse {
            query: query.to_string(),
            result,
            source_documents: results.into_iter().map(SourceDocument::from).collect(),
        })
    }

    /// Search the collection, enforcing descending-score order and at most
    /// `k` results regardless of backend behaviour.
    async fn retrieve(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let search = self
            .config
            .retry
            .run("search", || self.vector_store.search(&self.collection, embedding, k));

        let outcome = match self.config.retrieval_timeout() {
            Some(limit) => match tokio::time::timeout(limit, search).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RagError::Timeout { operation: "search".to_string() }),
            },
            None => search.await,
        };

        let mut results = match outcome {
            Ok(results) => results,
            Err(RagError::Timeout { operation }) => {
                warn!(collection = %self.collection, operation = %operation, "retrieval timed out, answering from empty context");
                return Ok(Vec::new());
            }
            Err(e) if !self.collection_exists().await => {
                warn!(collection = %self.collection, error = %e, "collection has not been indexed, answering from empty context");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(collection = %self.collection, error = %e, "vector store search failed");
                return Err(RagError::PipelineError(format!(
                    "search failed in collection '{}': {e}",
                    self.collection
                )));
            }
        };

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    /// Whether the collection exists. Consulted only after a failed search;
    /// if the store cannot answer, the collection is assumed to exist so the
    /// original failure is reported.
    async fn collection_exists(&self) -> bool {
        match self.vector_store.collection_exists(&self.collection).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!(collection = %self.collection, error = %e, "could not check collection existence");
                true
            }
        }
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// The embedding provider, vector store, language model and collection are
/// required. The config defaults to [`RagConfig::default()`] and the template
/// to the stuff template. Call [`build()`](QueryPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    collection: Option<String>,
    template: Option<PromptTemplate>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the language model.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Override the prompt template.
    pub fn prompt_template(mut self, template: PromptTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Build the [`QueryPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the collection name is empty.
    pub fn build(self) -> Result<QueryPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let language_model = self
            .language_model
            .ok_or_else(|| RagError::ConfigError("language_model is required".to_string()))?;
        let collection = self
            .collection
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| RagError::ConfigError("collection is required".to_string()))?;

        Ok(QueryPipeline {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
            language_model,
            collection,
            template: self.template.unwrap_or_default(),
        })
    }
}
