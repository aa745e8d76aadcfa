//! # docent-rag
//!
//! Retrieval-augmented question answering over a passage corpus.
//!
//! ## Overview
//!
//! - [`IndexingPipeline`] embeds every [`Passage`] (`title + "\n" + text`)
//!   and rebuilds a vector store collection from scratch.
//! - [`QueryPipeline`] embeds a question, retrieves the top-k documents by
//!   dot product, stuffs them into a [`PromptTemplate`] and asks a
//!   [`LanguageModel`] for the answer.
//!
//! Providers are capability traits so backends can be swapped without
//! touching the pipelines:
//!
//! | Trait | Backends |
//! |-------|----------|
//! | [`EmbeddingProvider`] | `openai::OpenAIEmbeddingProvider` (feature `openai`) |
//! | [`VectorStore`] | [`InMemoryVectorStore`], `qdrant::QdrantVectorStore` (feature `qdrant`) |
//! | [`LanguageModel`] | `openai::OpenAIChatModel` (feature `openai`) |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docent_rag::{InMemoryVectorStore, Passage, QueryPipeline, RagConfig};
//! use docent_rag::openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
//!
//! let pipeline = QueryPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .language_model(Arc::new(OpenAIChatModel::from_env()?))
//!     .collection("passages")
//!     .build()?;
//!
//! let passages = docent_rag::corpus::load_csv("passages.csv")?;
//! pipeline.indexing_pipeline().index(&passages).await?;
//! let response = pipeline.answer("What is the capital of France?").await?;
//! ```

pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod indexing;
pub mod inmemory;
pub mod llm;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod retry;
pub mod vectorstore;

pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    DocumentMetadata, IndexedDocument, Passage, QueryRequest, QueryResponse, SearchResult,
    SourceDocument,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use indexing::IndexingPipeline;
pub use inmemory::InMemoryVectorStore;
pub use llm::{GenerationConfig, LanguageModel};
pub use pipeline::{QueryPipeline, QueryPipelineBuilder};
pub use prompt::PromptTemplate;
pub use retry::RetryPolicy;
pub use vectorstore::VectorStore;
