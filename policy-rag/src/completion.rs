//! Completion service abstraction for answer synthesis.

use async_trait::async_trait;

use crate::error::ServiceError;

/// An external text-completion service.
///
/// Implementations wrap a specific backend (an OpenAI-compatible API, a
/// local model, a test fake) behind one async call. Every failure is a
/// [`ServiceError`]; the synthesizer does not distinguish causes.
///
/// # Example
///
/// ```rust,ignore
/// use policy_rag::CompletionService;
///
/// let reply = service
///     .complete("Answer only from the supplied policies.", "Question: ...")
///     .await?;
/// ```
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Produce a completion for `user_prompt` under `system_instruction`.
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, ServiceError>;
}

#[cfg(feature = "openai")]
pub use openai::OpenAICompletionClient;

#[cfg(feature = "openai")]
mod openai {
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tracing::{debug, error};

    use super::CompletionService;
    use crate::config::CompletionConfig;
    use crate::error::ServiceError;

    const PROVIDER: &str = "OpenAI";

    /// A [`CompletionService`] backed by an OpenAI-compatible
    /// `/chat/completions` endpoint.
    ///
    /// Uses `reqwest` to call the API directly. The request timeout is
    /// enforced by the synthesizer, not by the HTTP client.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use policy_rag::{CompletionConfig, OpenAICompletionClient};
    ///
    /// let client = OpenAICompletionClient::new(&CompletionConfig::from_env())?;
    /// ```
    pub struct OpenAICompletionClient {
        client: reqwest::Client,
        api_key: String,
        endpoint: String,
        model: String,
        temperature: f32,
        max_tokens: u32,
    }

    impl OpenAICompletionClient {
        /// Create a client from completion settings.
        ///
        /// # Errors
        ///
        /// Returns a [`ServiceError`] if no API key is configured.
        pub fn new(config: &CompletionConfig) -> Result<Self, ServiceError> {
            let api_key = config
                .api_key()
                .ok_or_else(|| ServiceError::new(PROVIDER, "API key must not be empty"))?
                .to_string();

            Ok(Self {
                client: reqwest::Client::new(),
                api_key,
                endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            })
        }
    }

    // ── Chat completion request/response types ──────────────────────

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: [ChatMessage<'a>; 2],
        temperature: f32,
        max_tokens: u32,
    }

    #[derive(Serialize)]
    struct ChatMessage<'a> {
        role: &'static str,
        content: &'a str,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    struct ChatChoice {
        message: ChatReply,
    }

    #[derive(Deserialize)]
    struct ChatReply {
        #[serde(default)]
        content: Option<String>,
    }

    #[derive(Deserialize)]
    struct ErrorResponse {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    // ── CompletionService implementation ─────────────────────────────

    #[async_trait]
    impl CompletionService for OpenAICompletionClient {
        fn name(&self) -> &str {
            PROVIDER
        }

        async fn complete(
            &self,
            system_instruction: &str,
            user_prompt: &str,
        ) -> Result<String, ServiceError> {
            debug!(provider = PROVIDER, model = %self.model, prompt_len = user_prompt.len(), "requesting completion");

            let request_body = ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage { role: "system", content: system_instruction },
                    ChatMessage { role: "user", content: user_prompt },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| {
                    error!(provider = PROVIDER, error = %e, "request failed");
                    ServiceError::new(PROVIDER, format!("request failed: {e}"))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);

                error!(provider = PROVIDER, %status, "API error");
                return Err(ServiceError::new(PROVIDER, format!("API returned {status}: {detail}")));
            }

            let chat: ChatResponse = response.json().await.map_err(|e| {
                error!(provider = PROVIDER, error = %e, "failed to parse response");
                ServiceError::new(PROVIDER, format!("failed to parse response: {e}"))
            })?;

            chat.choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.trim().is_empty())
                .ok_or_else(|| ServiceError::new(PROVIDER, "API returned an empty completion"))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn client_requires_api_key() {
            let config = CompletionConfig::default();
            assert!(OpenAICompletionClient::new(&config).is_err());
        }

        #[test]
        fn endpoint_joins_base_url_without_double_slash() {
            let config = CompletionConfig {
                api_key: Some("sk-test".into()),
                base_url: "http://localhost:8080/v1/".into(),
                ..CompletionConfig::default()
            };
            let client = OpenAICompletionClient::new(&config).unwrap();
            assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
        }

        #[test]
        fn request_body_has_system_then_user_message() {
            let body = ChatRequest {
                model: "m",
                messages: [
                    ChatMessage { role: "system", content: "sys" },
                    ChatMessage { role: "user", content: "usr" },
                ],
                temperature: 0.3,
                max_tokens: 10,
            };
            let json = serde_json::to_value(&body).unwrap();
            assert_eq!(json["messages"][0]["role"], "system");
            assert_eq!(json["messages"][1]["content"], "usr");
            assert_eq!(json["max_tokens"], 10);
        }

        #[test]
        fn reply_with_null_content_parses() {
            let parsed: ChatResponse =
                serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
            assert!(parsed.choices[0].message.content.is_none());
        }
    }
}
