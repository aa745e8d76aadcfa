//! End-to-end tests for indexing and answering with deterministic providers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{
    BrokenStore, CannedStore, FailingModel, FlakyEmbedder, KeywordEmbedder, RecordingModel,
    capitals, scored,
};
use docent_rag::{
    EmbeddingProvider, InMemoryVectorStore, Passage, QueryPipeline, RagConfig, RagError, Result,
    RetryPolicy,
};

const QUESTION: &str = "What is the capital of France?";

struct Fixture {
    embedder: Arc<KeywordEmbedder>,
    store: Arc<InMemoryVectorStore>,
    model: Arc<RecordingModel>,
    pipeline: QueryPipeline,
}

fn fixture(config: RagConfig) -> Fixture {
    let embedder = Arc::new(KeywordEmbedder::geography());
    let store = Arc::new(InMemoryVectorStore::new());
    let model = Arc::new(RecordingModel::new("Paris"));
    let pipeline = QueryPipeline::builder()
        .config(config)
        .embedding_provider(embedder.clone())
        .vector_store(store.clone())
        .language_model(model.clone())
        .collection("passages")
        .build()
        .unwrap();
    Fixture { embedder, store, model, pipeline }
}

#[tokio::test]
async fn answers_from_the_most_similar_passage() {
    let f = fixture(RagConfig::default());
    let indexed = f.pipeline.indexing_pipeline().index(&capitals()).await.unwrap();
    assert_eq!(indexed, 2);

    let response = f.pipeline.answer(QUESTION).await.unwrap();

    assert_eq!(response.query, QUESTION);
    assert_eq!(response.result, "Paris");
    let ids: Vec<i64> = response.source_documents.iter().map(|d| d.metadata.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let first = &response.source_documents[0];
    assert_eq!(first.page_content, "A\nParis is the capital of France.");
    assert_eq!(first.metadata.title, "A");
    assert_eq!(first.kind, "Document");
}

#[tokio::test]
async fn prompt_stuffs_context_in_ranked_order() {
    let f = fixture(RagConfig::default());
    f.pipeline.indexing_pipeline().index(&capitals()).await.unwrap();
    f.pipeline.answer(QUESTION).await.unwrap();

    let prompts = f.model.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.starts_with("Use the following pieces of context"));
    assert!(prompt.contains(
        "A\nParis is the capital of France.\n\nB\nTokyo is the capital of Japan."
    ));
    assert!(prompt.ends_with("Question: What is the capital of France?\nHelpful Answer:"));
}

#[tokio::test]
async fn top_k_bounds_source_documents() {
    let f = fixture(RagConfig::default());
    f.pipeline.indexing_pipeline().index(&capitals()).await.unwrap();

    let response = f.pipeline.answer_with_k(QUESTION, 1).await.unwrap();
    assert_eq!(response.source_documents.len(), 1);
    assert_eq!(response.source_documents[0].metadata.id, 1);
}

#[tokio::test]
async fn empty_index_still_generates_an_answer() {
    let f = fixture(RagConfig::default());
    f.pipeline.indexing_pipeline().index(&[]).await.unwrap();

    let response = f.pipeline.answer(QUESTION).await.unwrap();
    assert!(response.source_documents.is_empty());
    assert_eq!(response.result, "Paris");
    assert_eq!(f.model.prompts().len(), 1);
}

#[tokio::test]
async fn blank_query_is_rejected_before_any_provider_call() {
    let f = fixture(RagConfig::default());

    for query in ["", "   \n\t"] {
        let err = f.pipeline.answer(query).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidQuery(_)), "{err}");
    }
    let err = f.pipeline.answer_with_k(QUESTION, 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidQuery(_)));

    assert_eq!(f.embedder.calls(), 0);
    assert!(f.model.prompts().is_empty());
}

#[tokio::test]
async fn reindexing_replaces_the_collection() {
    let f = fixture(RagConfig::builder().batch_size(1).build().unwrap());
    let indexer = f.pipeline.indexing_pipeline();

    assert_eq!(indexer.index(&capitals()).await.unwrap(), 2);
    assert_eq!(indexer.index(&capitals()).await.unwrap(), 2);
    assert_eq!(f.store.len("passages").await, Some(2));

    let smaller = vec![Passage::new(7, "C", "Berlin is the capital of Germany.")];
    assert_eq!(indexer.index(&smaller).await.unwrap(), 1);
    assert_eq!(f.store.len("passages").await, Some(1));
}

#[tokio::test]
async fn duplicate_passage_ids_are_rejected() {
    let f = fixture(RagConfig::default());
    let passages = vec![Passage::new(1, "A", "first"), Passage::new(1, "A", "second")];

    let err = f.pipeline.indexing_pipeline().index(&passages).await.unwrap_err();
    assert!(matches!(err, RagError::DuplicatePassage(1)));
    assert_eq!(f.embedder.calls(), 0);
    assert_eq!(f.store.len("passages").await, None);
}

struct MisreportingEmbedder(KeywordEmbedder);

#[async_trait]
impl EmbeddingProvider for MisreportingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.0.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions() + 1
    }
}

#[tokio::test]
async fn wrong_embedding_size_aborts_indexing() {
    let pipeline = QueryPipeline::builder()
        .embedding_provider(Arc::new(MisreportingEmbedder(KeywordEmbedder::geography())))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(Arc::new(RecordingModel::new("unused")))
        .collection("passages")
        .build()
        .unwrap();

    let err = pipeline.indexing_pipeline().index(&capitals()).await.unwrap_err();
    match err {
        RagError::PipelineError(message) => assert!(message.contains("dimensions"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn generation_failure_surfaces_as_pipeline_error() {
    let pipeline = QueryPipeline::builder()
        .embedding_provider(Arc::new(KeywordEmbedder::geography()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(Arc::new(FailingModel))
        .collection("passages")
        .build()
        .unwrap();
    pipeline.indexing_pipeline().index(&capitals()).await.unwrap();

    let err = pipeline.answer(QUESTION).await.unwrap_err();
    match err {
        RagError::PipelineError(message) => assert!(message.contains("model offline"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn never_indexed_collection_answers_from_empty_context() {
    let f = fixture(RagConfig::default());

    let response = f.pipeline.answer(QUESTION).await.unwrap();
    assert_eq!(response.query, QUESTION);
    assert!(response.source_documents.is_empty());
    assert_eq!(response.result, "Paris");
    assert_eq!(f.model.prompts().len(), 1);
    assert_eq!(f.store.len("passages").await, None);
}

#[tokio::test]
async fn search_failure_on_existing_collection_is_a_pipeline_error() {
    let model = Arc::new(RecordingModel::new("unused"));
    let pipeline = QueryPipeline::builder()
        .embedding_provider(Arc::new(KeywordEmbedder::geography()))
        .vector_store(Arc::new(BrokenStore))
        .language_model(model.clone())
        .collection("passages")
        .build()
        .unwrap();

    let err = pipeline.answer(QUESTION).await.unwrap_err();
    match err {
        RagError::PipelineError(message) => assert!(message.contains("disk full"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn nan_scores_from_backend_do_not_panic() {
    let store = CannedStore::new(vec![
        scored(1, "A", "a", 0.2),
        scored(2, "B", "b", f32::NAN),
        scored(3, "C", "c", 0.8),
    ]);
    let pipeline = QueryPipeline::builder()
        .embedding_provider(Arc::new(KeywordEmbedder::geography()))
        .vector_store(Arc::new(store))
        .language_model(Arc::new(RecordingModel::new("ok")))
        .collection("passages")
        .build()
        .unwrap();

    let response = pipeline.answer_with_k(QUESTION, 3).await.unwrap();
    let ids: Vec<i64> = response
        .source_documents
        .iter()
        .map(|d| d.metadata.id)
        .filter(|id| *id != 2)
        .collect();
    assert_eq!(response.source_documents.len(), 3);
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn backend_results_are_reordered_and_truncated() {
    let store = CannedStore::new(vec![
        scored(3, "C", "low", 0.1),
        scored(1, "A", "high", 0.9),
        scored(2, "B", "mid", 0.5),
        scored(4, "D", "upper", 0.7),
    ]);
    let pipeline = QueryPipeline::builder()
        .embedding_provider(Arc::new(KeywordEmbedder::geography()))
        .vector_store(Arc::new(store))
        .language_model(Arc::new(RecordingModel::new("ok")))
        .collection("passages")
        .build()
        .unwrap();

    let response = pipeline.answer_with_k(QUESTION, 2).await.unwrap();
    let ids: Vec<i64> = response.source_documents.iter().map(|d| d.metadata.id).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test(start_paused = true)]
async fn slow_retrieval_degrades_to_empty_context() {
    let store = CannedStore::new(vec![scored(1, "A", "late", 1.0)])
        .with_delay(Duration::from_secs(30));
    let model = Arc::new(RecordingModel::new("I don't know."));
    let config = RagConfig::builder()
        .retry(RetryPolicy::none())
        .retrieval_timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let pipeline = QueryPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(KeywordEmbedder::geography()))
        .vector_store(Arc::new(store))
        .language_model(model.clone())
        .collection("passages")
        .build()
        .unwrap();

    let response = pipeline.answer(QUESTION).await.unwrap();
    assert!(response.source_documents.is_empty());
    assert_eq!(response.result, "I don't know.");
    assert!(!model.prompts()[0].contains("late"));
}

#[tokio::test(start_paused = true)]
async fn transient_embedding_failures_are_retried() {
    let embedder = Arc::new(FlakyEmbedder::new(2));
    let pipeline = QueryPipeline::builder()
        .embedding_provider(embedder.clone())
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(Arc::new(RecordingModel::new("Paris")))
        .collection("passages")
        .build()
        .unwrap();
    pipeline.indexing_pipeline().index(&[]).await.unwrap();

    let response = pipeline.answer(QUESTION).await.unwrap();
    assert_eq!(response.result, "Paris");
    assert_eq!(embedder.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn retries_are_bounded() {
    let embedder = Arc::new(FlakyEmbedder::new(usize::MAX));
    let pipeline = QueryPipeline::builder()
        .embedding_provider(embedder.clone())
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .language_model(Arc::new(RecordingModel::new("unused")))
        .collection("passages")
        .build()
        .unwrap();

    let err = pipeline.answer(QUESTION).await.unwrap_err();
    assert!(matches!(err, RagError::PipelineError(_)));
    assert_eq!(embedder.attempts(), RetryPolicy::default().max_attempts as usize);
}
