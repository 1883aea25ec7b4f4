//! Data types for policy documents, feature vectors, and query contracts.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default number of sources requested when a query does not specify one.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Smallest accepted `max_results`.
pub const MIN_MAX_RESULTS: usize = 1;

/// Largest accepted `max_results`.
pub const MAX_MAX_RESULTS: usize = 10;

/// A single policy in the corpus.
///
/// Documents are immutable once loaded. The whole corpus is replaced at once
/// through [`PolicyQaEngine::load_corpus`](crate::PolicyQaEngine::load_corpus).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDocument {
    /// Unique identifier for the policy.
    pub id: String,
    /// Human-readable policy title.
    pub title: String,
    /// The full policy text.
    pub content: String,
    /// Topic category, e.g. `"Leave"` or `"Benefits"`.
    pub category: String,
    /// Optional free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PolicyDocument {
    /// Create a policy document without tags.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
            tags: Vec::new(),
        }
    }

    /// Attach tags to the document.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The text the index encodes: title and content joined by a space.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// A keyword feature vector owned by one indexed [`PolicyDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    /// The ID of the owning [`PolicyDocument`].
    pub document_id: String,
    /// One component per vocabulary keyword, L2-normalized or all zero.
    pub values: Vec<f32>,
}

/// A policy paired with its similarity to a query. Produced per query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedMatch {
    /// The matched policy.
    pub document: PolicyDocument,
    /// Cosine similarity in `[-1, 1]` (higher is more relevant).
    pub score: f32,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// An employee question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// The free-text question. Must not be blank.
    pub question: String,
    /// Maximum number of sources to ground the answer on, `1..=10`.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl QueryRequest {
    /// Create a request with the default `max_results` of 3.
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), max_results: DEFAULT_MAX_RESULTS }
    }

    /// Override the number of sources requested.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Check the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] if:
    /// - `question` is empty or whitespace only
    /// - `max_results` is outside `1..=10`
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(RagError::Validation("question must not be empty".to_string()));
        }
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&self.max_results) {
            return Err(RagError::Validation(format!(
                "maxResults ({}) must be between {MIN_MAX_RESULTS} and {MAX_MAX_RESULTS}",
                self.max_results
            )));
        }
        Ok(())
    }
}

/// The answer returned for a [`QueryRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    /// The answer text, from the completion service or the fallback path.
    pub answer: String,
    /// Policies the answer is grounded on, in ranked order.
    pub sources: Vec<PolicyDocument>,
    /// Coarse confidence signal in `[0, 1]`.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_max_results_when_missing() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "What is the leave policy?"}"#).unwrap();
        assert_eq!(request.max_results, DEFAULT_MAX_RESULTS);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_uses_camel_case_on_the_wire() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "q", "maxResults": 7}"#).unwrap();
        assert_eq!(request.max_results, 7);
    }

    #[test]
    fn blank_question_is_rejected() {
        let err = QueryRequest::new("   \t").validate().unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }

    #[test]
    fn max_results_bounds_are_inclusive() {
        assert!(QueryRequest::new("q").with_max_results(1).validate().is_ok());
        assert!(QueryRequest::new("q").with_max_results(10).validate().is_ok());
        assert!(QueryRequest::new("q").with_max_results(0).validate().is_err());
        assert!(QueryRequest::new("q").with_max_results(11).validate().is_err());
    }

    #[test]
    fn tags_are_optional_in_json() {
        let doc: PolicyDocument = serde_json::from_str(
            r#"{"id": "p1", "title": "T", "content": "C", "category": "Leave"}"#,
        )
        .unwrap();
        assert!(doc.tags.is_empty());
        assert_eq!(doc.searchable_text(), "T C");
    }
}
