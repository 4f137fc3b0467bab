//! Calls to the upstream chat-completion API.
//!
//! [`ChatCompletion`] is the seam to the model provider; [`OpenAiClient`]
//! speaks the OpenAI chat-completions wire format. [`invoke`] is the single
//! boundary where upstream errors stop: it always yields a [`Completion`],
//! substituting the offline fallback when the call fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::context::{PromptMessage, PromptRole};
use crate::error::{Result, TutorError, UpstreamErrorKind};
use crate::fallback::fallback;

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Penalty for introducing tokens already present.
    pub presence_penalty: f32,
    /// Penalty proportional to token frequency.
    pub frequency_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
            presence_penalty: 0.1,
            frequency_penalty: 0.1,
        }
    }
}

/// A provider of chat completions.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Completes the given prompt, returning the reply text.
    async fn complete(&self, context: &[PromptMessage]) -> Result<String>;
}

/// Request body of the chat-completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    #[serde(flatten)]
    sampling: SamplingParams,
}

/// The subset of the chat-completions response we read.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    sampling: SamplingParams,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client from configuration.
    ///
    /// The HTTP client enforces the configured upstream timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()
            .map_err(|e| TutorError::http_client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.api_base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            sampling: SamplingParams::default(),
        })
    }

    /// Returns the full chat-completions URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, context: &[PromptMessage]) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TutorError::upstream(UpstreamErrorKind::MissingApiKey, "no API key configured")
        })?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: context,
            sampling: self.sampling,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = context.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(TutorError::upstream(
                kind_for_status(status),
                format!("HTTP {status}: {snippet}"),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(transport_error)?;
        first_choice_text(parsed)
    }
}

/// Classifies an HTTP status returned by the upstream.
fn kind_for_status(status: StatusCode) -> UpstreamErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamErrorKind::Authentication,
        StatusCode::TOO_MANY_REQUESTS => UpstreamErrorKind::RateLimit,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => UpstreamErrorKind::Timeout,
        s if s.is_server_error() => UpstreamErrorKind::Server,
        _ => UpstreamErrorKind::Other,
    }
}

/// Classifies a transport or decoding failure reported by `reqwest`.
fn transport_error(error: reqwest::Error) -> TutorError {
    let kind = if error.is_timeout() {
        UpstreamErrorKind::Timeout
    } else if error.is_decode() {
        UpstreamErrorKind::MalformedResponse
    } else {
        UpstreamErrorKind::Network
    };
    TutorError::upstream(kind, error.to_string())
}

/// Extracts the trimmed text of the first choice.
fn first_choice_text(response: ChatCompletionResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TutorError::upstream(
            UpstreamErrorKind::MalformedResponse,
            "response contained no choice text",
        ));
    }
    Ok(text)
}

/// Outcome of one upstream attempt.
#[derive(Debug)]
pub enum Completion {
    /// The model answered.
    Live(String),
    /// The call failed and the offline fallback was substituted.
    Offline {
        /// The fallback answer.
        text: String,
        /// Why the upstream call failed.
        cause: TutorError,
    },
}

impl Completion {
    /// Returns the answer text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Live(text) | Self::Offline { text, .. } => text,
        }
    }

    /// Consumes the outcome, returning the answer text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Live(text) | Self::Offline { text, .. } => text,
        }
    }

    /// Returns `true` if the fallback was used.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }
}

/// Makes a single upstream attempt bounded by `timeout`.
///
/// Never fails: on any error (including timeout) a warning is logged and
/// the offline answer for the last user entry of `context` is returned.
pub async fn invoke(
    client: &dyn ChatCompletion,
    context: &[PromptMessage],
    timeout: Duration,
) -> Completion {
    let result = match tokio::time::timeout(timeout, client.complete(context)).await {
        Ok(result) => result,
        Err(_) => Err(TutorError::upstream(
            UpstreamErrorKind::Timeout,
            format!("no response within {}s", timeout.as_secs()),
        )),
    };

    match result {
        Ok(text) => Completion::Live(text),
        Err(cause) => {
            warn!(
                kind = ?cause.upstream_kind(),
                error = %cause,
                "Completion API unavailable, answering offline"
            );
            let last_user_message = context
                .iter()
                .rev()
                .find(|message| message.role == PromptRole::User)
                .map_or("", |message| message.content.as_str());
            Completion::Offline {
                text: fallback(last_user_message),
                cause,
            }
        }
    }
}
