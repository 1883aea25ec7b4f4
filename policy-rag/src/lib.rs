//! # policy-rag
//!
//! Retrieval-augmented question answering over a small corpus of company
//! policies.
//!
//! ## Overview
//!
//! Questions and policies are encoded into bag-of-keywords feature vectors
//! over a fixed HR [`Vocabulary`]. Policies are ranked by cosine similarity,
//! and the best matches ground an answer produced by an external
//! [`CompletionService`]. When nothing matches, or the service is missing or
//! failing, the engine falls back to a deterministic answer, so a
//! well-formed question always gets a [`QueryResponse`].
//!
//! - [`PolicyQaEngine`]: validate, encode, rank, synthesize
//! - [`FeatureEncoder`]: text to normalized keyword vector
//! - [`PolicyIndex`] / [`IndexHandle`]: immutable index behind an atomic swap
//! - [`ranker`]: cosine similarity with a fixed relevance floor
//! - [`AnswerSynthesizer`]: grounded completion, fallback, and confidence
//!
//! ## Features
//!
//! - `openai` (default): [`OpenAICompletionClient`] for OpenAI-compatible APIs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use policy_rag::{EngineConfig, PolicyQaEngine, QueryRequest, default_corpus};
//!
//! let engine = PolicyQaEngine::builder().config(EngineConfig::from_env()).build()?;
//! engine.load_corpus(&default_corpus()).await;
//!
//! let response = engine.answer(QueryRequest::new("How many vacation days do I get?")).await?;
//! for source in &response.sources {
//!     println!("- {}", source.title);
//! }
//! ```

pub mod completion;
pub mod config;
pub mod corpus;
pub mod document;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod index;
pub mod ranker;
pub mod synthesizer;
pub mod vocabulary;

#[cfg(feature = "openai")]
pub use completion::OpenAICompletionClient;
pub use completion::CompletionService;
pub use config::{CompletionConfig, EngineConfig, EngineConfigBuilder};
pub use corpus::{default_corpus, load_corpus_file, parse_corpus};
pub use document::{FeatureVector, PolicyDocument, QueryRequest, QueryResponse, RankedMatch};
pub use encoder::FeatureEncoder;
pub use engine::{EngineHealth, PolicyQaEngine, PolicyQaEngineBuilder};
pub use error::{RagError, Result, ServiceError};
pub use index::{IndexHandle, IndexStats, IndexedPolicy, PolicyIndex};
pub use ranker::{RELEVANCE_FLOOR, cosine_similarity, rank};
pub use synthesizer::{AnswerSynthesizer, confidence_for};
pub use vocabulary::Vocabulary;
