//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docent_server::LogFormat;

/// Docent - question answering over a passage corpus
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log output format: pretty or json
    #[arg(long, env = "DOCENT_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the collection from a CSV corpus (columns id,title,text)
    Index {
        #[arg(long, value_name = "CSV")]
        corpus: PathBuf,

        #[command(flatten)]
        rag: RagArgs,
    },

    /// Answer one question and print the response as JSON
    Ask {
        question: String,

        /// Number of passages to retrieve (overrides --top-k)
        #[arg(short, long)]
        k: Option<usize>,

        /// Index this corpus before answering
        #[arg(long, value_name = "CSV")]
        corpus: Option<PathBuf>,

        #[command(flatten)]
        rag: RagArgs,
    },

    /// Serve POST /query over HTTP
    Serve {
        #[arg(long, env = "DOCENT_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Comma-separated keys accepted in the `apikey` header
        #[arg(long, env = "DOCENT_API_KEYS", hide_env_values = true)]
        api_keys: String,

        /// Index this corpus at startup
        #[arg(long, value_name = "CSV")]
        corpus: Option<PathBuf>,

        /// Per-request deadline in seconds
        #[arg(long, env = "DOCENT_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
        request_timeout_secs: u64,

        #[command(flatten)]
        rag: RagArgs,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process store; contents are lost on exit
    Memory,
    /// Qdrant over gRPC (requires the `qdrant` feature)
    Qdrant,
}

/// Provider and retrieval settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct RagArgs {
    #[arg(long, env = "DOCENT_COLLECTION", default_value = "passages")]
    pub collection: String,

    #[arg(long, value_enum, env = "DOCENT_STORE", default_value = "memory")]
    pub store: StoreKind,

    #[arg(long, env = "DOCENT_TOP_K", default_value_t = 4)]
    pub top_k: usize,

    /// Give up on retrieval after this many milliseconds and answer from an
    /// empty context
    #[arg(long, env = "DOCENT_RETRIEVAL_TIMEOUT_MS")]
    pub retrieval_timeout_ms: Option<u64>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "DOCENT_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Output size of the embedding model
    #[arg(long, env = "DOCENT_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    #[arg(long, env = "DOCENT_CHAT_MODEL")]
    pub chat_model: Option<String>,

    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6334")]
    pub qdrant_url: String,

    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    pub qdrant_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask() {
        let cli = Cli::try_parse_from([
            "docent",
            "ask",
            "What is the capital of France?",
            "-k",
            "2",
            "--corpus",
            "passages.csv",
            "--collection",
            "wiki",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask { question, k, corpus, rag } => {
                assert_eq!(question, "What is the capital of France?");
                assert_eq!(k, Some(2));
                assert_eq!(corpus, Some(PathBuf::from("passages.csv")));
                assert_eq!(rag.collection, "wiki");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_serve() {
        let cli = Cli::try_parse_from([
            "docent",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--api-keys",
            "a,b",
            "--store",
            "qdrant",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Serve { bind, api_keys, rag, .. } => {
                assert_eq!(bind.port(), 9000);
                assert_eq!(api_keys, "a,b");
                assert_eq!(rag.store, StoreKind::Qdrant);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn index_requires_a_corpus() {
        assert!(Cli::try_parse_from(["docent", "index"]).is_err());
    }

    #[test]
    fn rejects_unknown_store() {
        assert!(Cli::try_parse_from(["docent", "index", "--corpus", "c.csv", "--store", "faiss"]).is_err());
    }
}
