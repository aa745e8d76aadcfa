//! Deterministic providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docent_rag::{
    EmbeddingProvider, GenerationConfig, IndexedDocument, LanguageModel, Passage, RagError,
    Result, SearchResult, VectorStore,
};

/// Embeds text as keyword counts over a fixed vocabulary, so dot products are
/// exact shared-keyword counts.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn geography() -> Self {
        Self::new(&["paris", "france", "tokyo", "japan", "capital", "berlin", "germany"])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lowered = text.to_lowercase();
        let words: Vec<&str> =
            lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        Ok(self
            .vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Echoes a fixed answer and records every prompt it receives.
pub struct RecordingModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn new(reply: &str) -> Self {
        Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Always fails with a permanent generation error.
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
        Err(RagError::GenerationError { provider: "failing".into(), message: "model offline".into() })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Fails with a transient error for the first `failures` calls.
pub struct FlakyEmbedder {
    inner: KeywordEmbedder,
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn new(failures: usize) -> Self {
        Self { inner: KeywordEmbedder::geography(), failures, attempts: AtomicUsize::new(0) }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(RagError::Unavailable { provider: "flaky".into(), message: "503".into() });
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Returns canned results in the given (possibly unsorted) order, after an
/// optional delay.
pub struct CannedStore {
    results: Vec<SearchResult>,
    delay: Option<Duration>,
}

impl CannedStore {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl VectorStore for CannedStore {
    async fn create_collection(&self, _name: &str, _dimensions: usize) -> Result<()> {
        Ok(())
    }

    async fn delete_collection(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn collection_exists(&self, _name: &str) -> Result<bool> {
        Ok(true)
    }

    async fn upsert(&self, _collection: &str, _documents: &[IndexedDocument]) -> Result<()> {
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.results.clone())
    }
}

/// A store whose collection exists but whose searches always fail.
pub struct BrokenStore;

#[async_trait]
impl VectorStore for BrokenStore {
    async fn create_collection(&self, _name: &str, _dimensions: usize) -> Result<()> {
        Ok(())
    }

    async fn delete_collection(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    async fn collection_exists(&self, _name: &str) -> Result<bool> {
        Ok(true)
    }

    async fn upsert(&self, _collection: &str, _documents: &[IndexedDocument]) -> Result<()> {
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        Err(RagError::VectorStoreError { backend: "broken".into(), message: "disk full".into() })
    }
}

pub fn scored(id: i64, title: &str, text: &str, score: f32) -> SearchResult {
    SearchResult {
        document: IndexedDocument::from_passage(&Passage::new(id, title, text), vec![]),
        score,
    }
}

pub fn capitals() -> Vec<Passage> {
    vec![
        Passage::new(1, "A", "Paris is the capital of France."),
        Passage::new(2, "B", "Tokyo is the capital of Japan."),
    ]
}
