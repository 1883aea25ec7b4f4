//! Configuration for the policy question-answering engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::{DEFAULT_MAX_RESULTS, MAX_MAX_RESULTS, MIN_MAX_RESULTS};
use crate::error::{RagError, Result};

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the completion model.
pub const MODEL_ENV: &str = "POLICY_RAG_MODEL";
/// Environment variable overriding the completion API base URL.
pub const BASE_URL_ENV: &str = "POLICY_RAG_BASE_URL";
/// Environment variable overriding the completion timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "POLICY_RAG_TIMEOUT_MS";

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings for the external completion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    /// API credential. `None` or empty means the service is not configured.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Upper bound on a single completion call, in milliseconds.
    pub timeout_ms: u64,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            temperature: 0.3,
            max_tokens: 500,
        }
    }
}

impl CompletionConfig {
    /// Read settings from the environment, falling back to defaults.
    ///
    /// Unparseable or zero timeouts are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            model: std::env::var(MODEL_ENV).unwrap_or(defaults.model),
            base_url: std::env::var(BASE_URL_ENV).unwrap_or(defaults.base_url),
            timeout_ms: parse_timeout_ms(std::env::var(TIMEOUT_ENV).ok().as_deref())
                .unwrap_or(defaults.timeout_ms),
            ..defaults
        }
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Whether a completion credential is available.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// The completion timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Engine-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// `max_results` used by callers that do not choose one.
    pub default_max_results: usize,
    /// Completion service settings.
    pub completion: CompletionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { default_max_results: DEFAULT_MAX_RESULTS, completion: CompletionConfig::default() }
    }
}

impl EngineConfig {
    /// Create a new builder for constructing an [`EngineConfig`].
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Defaults with completion settings taken from the environment.
    pub fn from_env() -> Self {
        Self { completion: CompletionConfig::from_env(), ..Self::default() }
    }

    /// Check that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `default_max_results` is outside `1..=10`
    /// - the completion timeout is zero
    pub fn validate(&self) -> Result<()> {
        let max = self.default_max_results;
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&max) {
            return Err(RagError::Config(format!(
                "default_max_results ({max}) must be between {MIN_MAX_RESULTS} and {MAX_MAX_RESULTS}"
            )));
        }
        if self.completion.timeout_ms == 0 {
            return Err(RagError::Config("completion timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// A positive millisecond count, or `None` for anything else.
fn parse_timeout_ms(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse().ok()).filter(|ms| *ms > 0)
}

/// Builder for constructing a validated [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the default number of sources per answer.
    pub fn default_max_results(mut self, max_results: usize) -> Self {
        self.config.default_max_results = max_results;
        self
    }

    /// Set the completion service settings.
    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.config.completion = completion;
        self
    }

    /// Set the completion timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.completion.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Build the [`EngineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] under the same conditions as
    /// [`EngineConfig::validate`].
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
