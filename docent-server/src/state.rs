use std::collections::HashSet;
use std::sync::Arc;

use docent_rag::QueryPipeline;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<QueryPipeline>,
    api_keys: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(pipeline: Arc<QueryPipeline>, api_keys: HashSet<String>) -> Self {
        Self { pipeline, api_keys: Arc::new(api_keys) }
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.api_keys.contains(key)
    }
}
