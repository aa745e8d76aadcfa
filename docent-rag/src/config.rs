//! Configuration for the indexing and query pipelines.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::llm::GenerationConfig;
use crate::retry::RetryPolicy;

/// Configuration parameters shared by the indexing and query pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of documents retrieved per query.
    pub top_k: usize,
    /// Number of passages embedded per provider call during indexing.
    pub batch_size: usize,
    /// Decoding parameters for answer generation.
    pub generation: GenerationConfig,
    /// Retry behaviour for provider calls.
    pub retry: RetryPolicy,
    /// Deadline for a single vector search. When it expires the answer is
    /// generated from an empty context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_timeout_ms: Option<u64>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            batch_size: 32,
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            retrieval_timeout_ms: None,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// The retrieval deadline, if one is configured.
    pub fn retrieval_timeout(&self) -> Option<Duration> {
        self.retrieval_timeout_ms.map(Duration::from_millis)
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of documents retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the indexing batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.generation.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.generation.max_output_tokens = tokens;
        self
    }

    /// Set the retry policy for provider calls.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set the per-search deadline.
    pub fn retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.config.retrieval_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k == 0`
    /// - `batch_size == 0`
    /// - `max_output_tokens == 0`
    /// - `temperature` is negative or not finite
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.batch_size == 0 {
            return Err(RagError::ConfigError("batch_size must be greater than zero".to_string()));
        }
        if self.config.generation.max_output_tokens == 0 {
            return Err(RagError::ConfigError(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }
        let temperature = self.config.generation.temperature;
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(RagError::ConfigError(format!(
                "temperature ({temperature}) must be a non-negative number"
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_deterministic_and_small() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.max_output_tokens, 256);
        assert!(config.retrieval_timeout().is_none());
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn rejects_negative_temperature() {
        assert!(RagConfig::builder().temperature(-0.5).build().is_err());
    }

    #[test]
    fn deserializes_without_optional_timeout() {
        let json = serde_json::json!({
            "top_k": 2,
            "batch_size": 8,
            "generation": {"temperature": 0.0, "max_output_tokens": 64},
            "retry": {"max_attempts": 1, "initial_backoff_ms": 10, "max_backoff_ms": 10, "multiplier": 1.0}
        });
        let config: RagConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.retrieval_timeout_ms, None);
    }
}
