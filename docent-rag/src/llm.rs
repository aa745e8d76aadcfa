//! Language model trait for answer generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Decoding parameters passed to every [`LanguageModel::generate`] call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature. `0.0` gives deterministic decoding.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.0, max_output_tokens: 256 }
    }
}

/// A provider that turns a prompt into generated text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    /// Provider or model name, used in logs.
    fn name(&self) -> &str;
}
