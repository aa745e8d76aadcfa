//! "Stuff" prompt construction.
//!
//! Every retrieved document is injected verbatim, in ranked order, ahead of
//! the question. There is no summarization or compression step.

use crate::document::SearchResult;

/// The default question-answering template. `{context}` and `{question}` are
/// replaced by [`PromptTemplate::render`].
pub const DEFAULT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:";

/// Separator placed between consecutive documents in the context block.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// A prompt template with `{context}` and `{question}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_string() }
    }
}

impl PromptTemplate {
    /// Use a custom template. Missing placeholders are simply not filled.
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Concatenate document texts in ranked order.
    pub fn context(results: &[SearchResult]) -> String {
        results.iter().map(|r| r.document.text.as_str()).collect::<Vec<_>>().join(DOCUMENT_SEPARATOR)
    }

    /// Fill the template with the retrieved context and the question.
    pub fn render(&self, results: &[SearchResult], question: &str) -> String {
        let context = Self::context(results);
        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        // Single pass, so placeholders inside the substituted text stay literal.
        loop {
            let next = [(CONTEXT_PLACEHOLDER, context.as_str()), (QUESTION_PLACEHOLDER, question)]
                .into_iter()
                .filter_map(|(placeholder, value)| {
                    rest.find(placeholder).map(|pos| (pos, placeholder, value))
                })
                .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, placeholder, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + placeholder.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}
