//! Policy question-answering engine.
//!
//! The [`PolicyQaEngine`] is the only type callers outside this crate need.
//! It owns the [`FeatureEncoder`], the swappable [`IndexHandle`], and the
//! [`AnswerSynthesizer`], and runs each question through
//! validate → encode → rank → synthesize.
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_rag::{EngineConfig, PolicyQaEngine, QueryRequest, default_corpus};
//!
//! let engine = PolicyQaEngine::builder().config(EngineConfig::from_env()).build()?;
//! engine.load_corpus(&default_corpus()).await;
//!
//! let response = engine.answer(QueryRequest::new("What is the leave policy?")).await?;
//! println!("{} ({:.1})", response.answer, response.confidence);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::completion::CompletionService;
use crate::config::EngineConfig;
use crate::document::{PolicyDocument, QueryRequest, QueryResponse, RankedMatch};
use crate::encoder::FeatureEncoder;
use crate::error::{RagError, Result};
use crate::index::{IndexHandle, IndexStats};
use crate::ranker;
use crate::synthesizer::AnswerSynthesizer;
use crate::vocabulary::Vocabulary;

/// Liveness information for the surrounding system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineHealth {
    /// Number of policies in the current index.
    pub index_size: usize,
    /// Whether a completion service is available.
    pub completion_configured: bool,
}

/// Retrieval-augmented question answering over a policy corpus.
///
/// Safe to share across tasks behind an `Arc`; queries run concurrently and
/// [`load_corpus`](Self::load_corpus) may be called at any time.
pub struct PolicyQaEngine {
    config: EngineConfig,
    encoder: FeatureEncoder,
    index: IndexHandle,
    synthesizer: AnswerSynthesizer,
}

impl PolicyQaEngine {
    /// Create a new [`PolicyQaEngineBuilder`].
    pub fn builder() -> PolicyQaEngineBuilder {
        PolicyQaEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return a reference to the feature encoder.
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Replace the whole corpus.
    ///
    /// The new index is built off to the side and published in one swap.
    /// Documents that fail to encode are skipped and counted in the
    /// returned stats.
    pub async fn load_corpus(&self, corpus: &[PolicyDocument]) -> IndexStats {
        self.index.rebuild(&self.encoder, corpus).await
    }

    /// A request for `question` using the configured default `max_results`.
    pub fn request(&self, question: impl Into<String>) -> QueryRequest {
        QueryRequest::new(question).with_max_results(self.config.default_max_results)
    }

    /// Answer an employee question.
    ///
    /// Before any corpus is loaded the question is answered as if nothing
    /// matched. Completion failures degrade the answer but never fail the
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Validation`] if the question is blank or
    /// `max_results` is outside `1..=10`. No other error is returned.
    pub async fn answer(&self, request: QueryRequest) -> Result<QueryResponse> {
        request.validate()?;

        let matches = self.retrieve(&request.question, request.max_results).await;
        debug!(match_count = matches.len(), "retrieval finished");

        let response = self.synthesizer.synthesize(&request.question, matches).await;
        info!(
            source_count = response.sources.len(),
            confidence = response.confidence,
            "query completed"
        );
        Ok(response)
    }

    /// Rank the current index snapshot against `question`.
    ///
    /// Returns an empty list if no corpus has been loaded yet.
    pub async fn retrieve(&self, question: &str, max_results: usize) -> Vec<RankedMatch> {
        let query = self.encoder.encode(question);
        match self.index.snapshot().await {
            Ok(index) => ranker::rank(&index, &query, max_results),
            Err(e) => {
                debug!(error = %e, "answering without an index");
                Vec::new()
            }
        }
    }

    /// Current index size and completion availability.
    pub async fn health(&self) -> EngineHealth {
        EngineHealth {
            index_size: self.index.size().await,
            completion_configured: self.synthesizer.has_completion_service(),
        }
    }
}

/// Builder for constructing a [`PolicyQaEngine`].
///
/// Every field is optional. Without an explicit completion service, one is
/// created from the configured credential when the `openai` feature is
/// enabled.
///
/// # Example
///
/// ```rust,ignore
/// let engine = PolicyQaEngine::builder()
///     .config(EngineConfig::default())
///     .completion_service(Arc::new(my_service))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct PolicyQaEngineBuilder {
    config: Option<EngineConfig>,
    vocabulary: Option<Vocabulary>,
    completion: Option<Arc<dyn CompletionService>>,
}

impl PolicyQaEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the built-in HR vocabulary.
    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Use `service` for completions instead of the configured client.
    pub fn completion_service(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(service);
        self
    }

    /// Build the [`PolicyQaEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the configuration is invalid or the
    /// vocabulary is empty.
    pub fn build(self) -> Result<PolicyQaEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let vocabulary = self.vocabulary.unwrap_or_default();
        if vocabulary.is_empty() {
            return Err(RagError::Config("vocabulary must contain at least one keyword".to_string()));
        }

        let completion = self.completion.or_else(|| default_completion(&config));
        if completion.is_none() {
            info!("no completion credential configured, answers will use the fallback path");
        }

        let synthesizer = AnswerSynthesizer::new(completion, config.completion.timeout());
        Ok(PolicyQaEngine {
            config,
            encoder: FeatureEncoder::new(vocabulary),
            index: IndexHandle::new(),
            synthesizer,
        })
    }
}

#[cfg(feature = "openai")]
fn default_completion(config: &EngineConfig) -> Option<Arc<dyn CompletionService>> {
    use crate::completion::OpenAICompletionClient;

    if !config.completion.is_configured() {
        return None;
    }
    match OpenAICompletionClient::new(&config.completion) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to create completion client");
            None
        }
    }
}

#[cfg(not(feature = "openai"))]
fn default_completion(_config: &EngineConfig) -> Option<Arc<dyn CompletionService>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::default_corpus;

    #[tokio::test]
    async fn unloaded_engine_answers_with_topic_list() {
        let engine = PolicyQaEngine::builder().build().unwrap();
        let response = engine.answer(QueryRequest::new("vacation days")).await.unwrap();
        assert!(response.sources.is_empty());
        assert_eq!(response.confidence, 0.1);
    }

    #[tokio::test]
    async fn health_reports_index_size() {
        let engine = PolicyQaEngine::builder().build().unwrap();
        assert_eq!(
            engine.health().await,
            EngineHealth { index_size: 0, completion_configured: false }
        );

        let stats = engine.load_corpus(&default_corpus()).await;
        assert_eq!(stats.indexed, default_corpus().len());
        assert_eq!(engine.health().await.index_size, default_corpus().len());
    }

    #[tokio::test]
    async fn validation_error_is_returned() {
        let engine = PolicyQaEngine::builder().build().unwrap();
        let err = engine.answer(QueryRequest::new("")).await.unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let result = PolicyQaEngine::builder().vocabulary(Vocabulary::new(Vec::<String>::new())).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }

    #[test]
    fn deserialized_config_with_zero_max_results_is_rejected() {
        let config: EngineConfig = serde_json::from_str(r#"{"default_max_results": 0}"#).unwrap();
        let result = PolicyQaEngine::builder().config(config).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }

    #[test]
    fn config_with_zero_timeout_is_rejected() {
        let mut config = EngineConfig::default();
        config.completion.timeout_ms = 0;
        let result = PolicyQaEngine::builder().config(config).build();
        assert!(matches!(result, Err(RagError::Config(_))));
    }

    #[test]
    fn request_uses_configured_default() {
        let config = EngineConfig::builder().default_max_results(5).build().unwrap();
        let engine = PolicyQaEngine::builder().config(config).build().unwrap();
        assert_eq!(engine.request("q").max_results, 5);
    }

    #[test]
    fn health_serializes_camel_case() {
        let json = serde_json::to_value(EngineHealth { index_size: 2, completion_configured: true })
            .unwrap();
        assert_eq!(json["indexSize"], 2);
        assert_eq!(json["completionConfigured"], true);
    }
}
