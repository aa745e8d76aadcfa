//! Error types for the `docent-rag` crate.

use thiserror::Error;

/// Errors that can occur while indexing passages or answering queries.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The language model failed to produce an answer.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The language model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A provider is temporarily unavailable (connection failure, rate limit,
    /// 5xx). Retried by [`RetryPolicy`](crate::RetryPolicy).
    #[error("Provider unavailable ({provider}): {message}")]
    Unavailable {
        /// The provider that could not be reached.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An operation exceeded its deadline.
    #[error("Timed out during {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
    },

    /// The query was rejected before reaching any provider.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Two passages in one indexing run share an id.
    #[error("Duplicate passage id {0} in corpus")]
    DuplicatePassage(i64),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The corpus could not be read or parsed.
    #[error("Corpus error: {0}")]
    CorpusError(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether retrying the failed operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RagError::Unavailable { .. } | RagError::Timeout { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
