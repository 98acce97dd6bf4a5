//! OpenRouter (OpenAI-compatible chat completions) reaction generator.
//!
//! One request per call: the persona description as the system message,
//! the post plus context as the user message, and `response_format:
//! json_object`. The first choice's content is parsed into a
//! [`GeneratedReaction`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::llms::generator::{GeneratedReaction, ReactionGenerator};
use crate::utilities::converter::extract_json_object;

/// First retry waits this long; each further retry doubles it.
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct OpenRouterGenerator {
    config: GeneratorConfig,
    client: reqwest::Client,
    retry_delay: Duration,
}

impl OpenRouterGenerator {
    /// Build the generator and its HTTP client.
    ///
    /// A missing API key is not an error here; the generator simply reports
    /// itself unavailable.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            config,
            client,
            retry_delay: INITIAL_RETRY_DELAY,
        })
    }

    /// Override the initial retry backoff.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request_body(&self, system_description: &str, content: &str, context: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_description },
                {
                    "role": "user",
                    "content": format!(
                        "Post: {content}\n\nContext: {context}\n\n\
                         Answer with a JSON object with the keys reaction_type, \
                         comment_text, sentiment and engagement_likelihood."
                    ),
                },
            ],
            "response_format": { "type": "json_object" },
        })
    }

    /// Pull the first choice's message content out of a completions response.
    fn parse_completion(response: &Value) -> Result<GeneratedReaction, GenerationError> {
        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GenerationError::MalformedOutput("response has no message content".to_string())
            })?;

        let object = extract_json_object(content)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
        serde_json::from_value::<GeneratedReaction>(object)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?
            .validate()
    }
}

#[async_trait]
impl ReactionGenerator for OpenRouterGenerator {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn is_available(&self) -> bool {
        self.config.has_credential()
    }

    async fn generate(
        &self,
        system_description: &str,
        content: &str,
        context: &str,
    ) -> Result<GeneratedReaction, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::Unavailable("OPENROUTER_API_KEY not set".into()))?;

        let endpoint = self.endpoint();
        let body = self.build_request_body(system_description, content, context);
        tracing::debug!(model = %self.config.model, %endpoint, "requesting reaction");

        let mut last_error: Option<GenerationError> = None;
        let mut retry_delay = self.retry_delay;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(attempt, delay = ?retry_delay, "retrying generation request");
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                last_error = Some(GenerationError::Status {
                    status: status.as_u16(),
                    body: truncate(&text),
                });
                continue;
            }

            if !status.is_success() {
                return Err(GenerationError::Status {
                    status: status.as_u16(),
                    body: truncate(&text),
                });
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                GenerationError::MalformedOutput(format!("{e}: {}", truncate(&text)))
            })?;
            return Self::parse_completion(&json);
        }

        Err(last_error.unwrap_or_else(|| {
            GenerationError::Unavailable("generation failed after all retries".into())
        }))
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(500).collect()
}
