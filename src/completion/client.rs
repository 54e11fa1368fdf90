use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ChatRequest, ChatResponse, Message};
use crate::config::{ApiKey, AppIdentity, env_or, env_var};
use crate::text::truncate_chars;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";
const DEFAULT_LOCAL_MODEL: &str = "llama3.2";
const ERROR_SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("OPENROUTER_API_KEY not set")]
    ApiKeyNotSet,

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("completion returned no content")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Configuration via environment variables:
/// - `OPENROUTER_API_KEY`: required for the hosted endpoint
/// - `OPENROUTER_MODEL`, `OPENROUTER_BASE_URL`: optional overrides
/// - `LOCAL_MODEL_URL`, `LOCAL_MODEL`: keyless local endpoint (e.g. Ollama's `/v1`)
/// - `APP_NAME`, `APP_URL`: sent as `X-Title` and `HTTP-Referer`
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
    app: AppIdentity,
}

impl ChatClient {
    /// Hosted endpoint; fails when no credential is configured.
    pub fn from_env(http: Client) -> Result<Self, CompletionError> {
        let api_key = env_var("OPENROUTER_API_KEY").ok_or(CompletionError::ApiKeyNotSet)?;
        Ok(Self::new(
            http,
            &env_or("OPENROUTER_BASE_URL", DEFAULT_BASE_URL),
            &env_or("OPENROUTER_MODEL", DEFAULT_MODEL),
            Some(api_key),
            AppIdentity::from_env(),
        ))
    }

    /// Keyless local endpoint, present only when `LOCAL_MODEL_URL` is set.
    pub fn local_from_env(http: Client) -> Option<Self> {
        let base_url = env_var("LOCAL_MODEL_URL")?;
        Some(Self::new(
            http,
            &base_url,
            &env_or("LOCAL_MODEL", DEFAULT_LOCAL_MODEL),
            None,
            AppIdentity::from_env(),
        ))
    }

    pub fn new(
        http: Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        app: AppIdentity,
    ) -> Self {
        Self {
            http,
            api_key: api_key.map(ApiKey),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self::new(
            http,
            base_url,
            DEFAULT_MODEL,
            Some("test-key".to_string()),
            AppIdentity::default(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one chat request and returns the trimmed first choice.
    pub async fn chat(&self, messages: &[Message], max_tokens: u32) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        let mut builder = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .header("HTTP-Referer", &self.app.url)
            .header("X-Title", &self.app.name)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(&key.0);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet = truncate_chars(&text, ERROR_SNIPPET_CHARS);
            warn!(status = %status, body = %snippet, "chat completion error");
            let message = serde_json::from_str::<ChatResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| format!("HTTP {status}: {snippet}"));
            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;

        if let Some(err) = &body.error {
            let message = err.message.clone().unwrap_or_else(|| "Unknown error".to_string());
            warn!(error = %message, "chat completion error in 200 response");
            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let content = body
            .first_content()
            .filter(|c| !c.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;
        debug!(model = %self.model, chars = content.len(), "chat completion done");
        Ok(content.to_string())
    }
}
