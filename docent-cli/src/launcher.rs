//! Wiring from parsed arguments to providers, pipelines and the server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use docent_rag::openai::{OpenAIChatModel, OpenAIEmbeddingProvider};
use docent_rag::{InMemoryVectorStore, QueryPipeline, RagConfig, VectorStore};
use docent_server::ServerConfig;
use docent_server::config::parse_api_keys;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, RagArgs, StoreKind};

/// Run the parsed command to completion.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index { corpus, rag } => {
            if rag.store == StoreKind::Memory {
                warn!("indexing into the in-memory store; the index is discarded on exit");
            }
            let pipeline = build_pipeline(&rag)?;
            let count = index_corpus(&pipeline, &corpus).await?;
            println!("indexed {count} passages into '{}'", pipeline.collection());
        }
        Commands::Ask { question, k, corpus, rag } => {
            let pipeline = build_pipeline(&rag)?;
            if let Some(corpus) = corpus {
                index_corpus(&pipeline, &corpus).await?;
            }
            let response = pipeline
                .answer_with_k(&question, k.unwrap_or(rag.top_k))
                .await
                .context("failed to answer question")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Serve { bind, api_keys, corpus, request_timeout_secs, rag } => {
            let config = ServerConfig::new(parse_api_keys(&api_keys))?
                .with_bind(bind)
                .with_collection(rag.collection.clone())
                .with_request_timeout(Duration::from_secs(request_timeout_secs));

            let pipeline = build_pipeline(&rag)?;
            match corpus {
                Some(corpus) => {
                    index_corpus(&pipeline, &corpus).await?;
                }
                None if rag.store == StoreKind::Memory => {
                    warn!("serving an empty in-memory index; pass --corpus to load passages");
                }
                None => {}
            }

            docent_server::serve(config, Arc::new(pipeline)).await?;
        }
    }
    Ok(())
}

/// Build a query pipeline from the shared provider arguments.
pub fn build_pipeline(args: &RagArgs) -> Result<QueryPipeline> {
    let mut config = RagConfig::builder().top_k(args.top_k);
    if let Some(ms) = args.retrieval_timeout_ms {
        config = config.retrieval_timeout(Duration::from_millis(ms));
    }
    let config = config.build()?;

    let api_key = args
        .openai_api_key
        .clone()
        .context("an OpenAI-compatible API key is required (--openai-api-key or OPENAI_API_KEY)")?;

    let mut embedder = OpenAIEmbeddingProvider::new(api_key.clone())?;
    let mut chat = OpenAIChatModel::new(api_key)?;
    if let Some(base_url) = &args.openai_base_url {
        embedder = embedder.with_base_url(base_url);
        chat = chat.with_base_url(base_url);
    }
    if let Some(model) = &args.embedding_model {
        embedder = embedder.with_model(model);
    }
    if let Some(dimensions) = args.embedding_dimensions {
        embedder = embedder.with_dimensions(dimensions);
    }
    if let Some(model) = &args.chat_model {
        chat = chat.with_model(model);
    }

    let pipeline = QueryPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .vector_store(build_store(args)?)
        .language_model(Arc::new(chat))
        .collection(args.collection.clone())
        .build()?;
    Ok(pipeline)
}

fn build_store(args: &RagArgs) -> Result<Arc<dyn VectorStore>> {
    match args.store {
        StoreKind::Memory => Ok(Arc::new(InMemoryVectorStore::new())),
        #[cfg(feature = "qdrant")]
        StoreKind::Qdrant => {
            let store = docent_rag::qdrant::QdrantVectorStore::new(
                &args.qdrant_url,
                args.qdrant_api_key.clone(),
            )?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "qdrant"))]
        StoreKind::Qdrant => {
            anyhow::bail!("this build of docent has no Qdrant support; rebuild with --features qdrant")
        }
    }
}

async fn index_corpus(pipeline: &QueryPipeline, corpus: &Path) -> Result<usize> {
    let passages = docent_rag::corpus::load_csv(corpus)?;
    let count = pipeline
        .indexing_pipeline()
        .index(&passages)
        .await
        .with_context(|| format!("failed to index {}", corpus.display()))?;
    info!(collection = pipeline.collection(), count, "corpus indexed");
    Ok(count)
}
