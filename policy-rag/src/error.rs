//! Error types for the `policy-rag` crate.

use thiserror::Error;

/// A failure reported by an external completion service.
///
/// Transport, authentication, timeout, and response-parsing problems all
/// collapse into this one type. Callers are not expected to branch on the
/// cause; the answer synthesizer treats every `ServiceError` the same way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Completion service error ({provider}): {message}")]
pub struct ServiceError {
    /// The completion provider that produced the error.
    pub provider: String,
    /// A description of the failure.
    pub message: String,
}

impl ServiceError {
    /// Create a new service error for the given provider.
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self { provider: provider.into(), message: message.into() }
    }
}

/// Errors that can occur in policy question answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// The incoming request is malformed. Rejected before any work begins.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A query arrived before any corpus was loaded.
    #[error("Policy index unavailable: no corpus has been loaded")]
    IndexUnavailable,

    /// The external completion service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A policy corpus could not be read or is inconsistent.
    #[error("Corpus error: {0}")]
    Corpus(String),
}

/// A convenience result type for policy RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
