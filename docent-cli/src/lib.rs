//! # docent-cli
//!
//! The `docent` launcher:
//!
//! ```text
//! docent index --corpus passages.csv --store qdrant
//! docent ask "What is the capital of France?" --corpus passages.csv
//! docent serve --api-keys secret --corpus passages.csv
//! ```
//!
//! Every flag has an environment fallback (`OPENAI_API_KEY`, `DOCENT_API_KEYS`,
//! `QDRANT_URL`, ...); see `docent --help`.

pub mod cli;
pub mod launcher;

pub use cli::{Cli, Commands, RagArgs, StoreKind};
pub use launcher::{build_pipeline, run};
