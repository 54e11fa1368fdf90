use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::normalize_code;
use crate::config::{ApiKey, env_var};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("translation returned no text")]
    Empty,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Best-effort translation. Never fails: on any problem the input comes back
/// unchanged.
pub trait Translate {
    fn translate(&self, text: &str, dest: &str) -> impl Future<Output = String> + Send;
}

/// Identity translator used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

impl Translate for DisabledTranslator {
    async fn translate(&self, text: &str, _dest: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    http: Client,
    base_url: String,
    api_key: Option<ApiKey>,
}

impl HttpTranslator {
    /// Returns `None` unless `TRANSLATE_URL` is set.
    pub fn from_env(http: Client) -> Option<Self> {
        let base_url = env_var("TRANSLATE_URL")?;
        Some(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: env_var("TRANSLATE_API_KEY").map(ApiKey),
        })
    }

    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub async fn try_translate(&self, text: &str, dest: &str) -> Result<String, TranslateError> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: dest,
            format: "text",
            api_key: self.api_key.as_ref().map(|k| k.0.as_str()),
        };

        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TranslateResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or(text);
            return Err(TranslateError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: TranslateResponse = response.json().await?;
        body.translated_text
            .filter(|t| !t.trim().is_empty())
            .ok_or(TranslateError::Empty)
    }
}

impl Translate for HttpTranslator {
    async fn translate(&self, text: &str, dest: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let dest = normalize_code(dest);
        match self.try_translate(text, &dest).await {
            Ok(translated) => {
                debug!(dest = %dest, "translated text");
                translated
            }
            Err(e) => {
                warn!(error = %e, dest = %dest, "translation failed, keeping original text");
                text.to_string()
            }
        }
    }
}

/// Runtime choice between the configured backend and the identity fallback.
#[derive(Debug, Clone)]
pub enum Translator {
    Disabled(DisabledTranslator),
    Http(HttpTranslator),
}

impl Translator {
    pub fn from_env(http: Client) -> Self {
        match HttpTranslator::from_env(http) {
            Some(backend) => Self::Http(backend),
            None => {
                debug!("TRANSLATE_URL not set, translation disabled");
                Self::Disabled(DisabledTranslator)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl Translate for Translator {
    async fn translate(&self, text: &str, dest: &str) -> String {
        match self {
            Self::Disabled(t) => t.translate(text, dest).await,
            Self::Http(t) => t.translate(text, dest).await,
        }
    }
}
