//! Data types for passages, indexed documents, search results and answers.

use serde::{Deserialize, Serialize};

/// The `type` tag carried by every [`SourceDocument`].
pub const SOURCE_DOCUMENT_TYPE: &str = "Document";

/// A passage from the knowledge base corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    /// Unique identifier for the passage.
    pub id: i64,
    /// The passage title.
    pub title: String,
    /// The passage body.
    pub text: String,
}

impl Passage {
    /// Create a new passage.
    pub fn new(id: i64, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id, title: title.into(), text: text.into() }
    }

    /// The text blob that gets embedded: title and body separated by a newline.
    pub fn content(&self) -> String {
        format!("{}\n{}", self.title, self.text)
    }

    /// Metadata stored alongside the passage in the index.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata { title: self.title.clone(), id: self.id }
    }
}

/// Metadata attached to indexed and retrieved documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Title of the source passage.
    pub title: String,
    /// Id of the source passage.
    pub id: i64,
}

/// A [`Passage`] with its vector embedding, as held by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedDocument {
    /// Same as the source passage id.
    pub id: i64,
    /// The embedding of [`text`](IndexedDocument::text).
    pub vector: Vec<f32>,
    /// The embedded text blob (`title + "\n" + text`).
    pub text: String,
    /// Title and id of the source passage.
    pub metadata: DocumentMetadata,
}

impl IndexedDocument {
    /// Build an indexed document from a passage and its embedding.
    pub fn from_passage(passage: &Passage, vector: Vec<f32>) -> Self {
        Self { id: passage.id, vector, text: passage.content(), metadata: passage.metadata() }
    }
}

/// A retrieved [`IndexedDocument`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved document. Backends may leave `vector` empty.
    pub document: IndexedDocument,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A retrieved passage returned alongside a generated answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    pub page_content: String,
    pub metadata: DocumentMetadata,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<SearchResult> for SourceDocument {
    fn from(result: SearchResult) -> Self {
        Self {
            page_content: result.document.text,
            metadata: result.document.metadata,
            kind: SOURCE_DOCUMENT_TYPE.to_string(),
        }
    }
}

/// A question submitted over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
}

/// The answer to a single query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    /// The question exactly as asked.
    pub query: String,
    /// The generated answer.
    pub result: String,
    /// Retrieved passages, most similar first.
    pub source_documents: Vec<SourceDocument>,
}
