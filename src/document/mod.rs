pub mod extract;
pub mod summary;

use std::path::Path;

use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::completion::ChatClient;
use crate::text::{normalize_whitespace, truncate_chars};
pub use extract::{ExtractError, ExtractOptions, ExtractionResult, FileKind, Strategy};
use summary::{SUMMARY_MAX_TOKENS, local_summary, summary_messages};

pub const MAX_SUMMARY_CHARS: usize = 5000;
pub const NO_TEXT_REPLY: &str = "No readable text could be extracted from the uploaded file.";
pub const ANALYSIS_FAILED_REPLY: &str = "An error occurred while analyzing the uploaded file.";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("extraction worker failed: {0}")]
    Worker(#[from] JoinError),
}

#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    remote: Option<ChatClient>,
    local: Option<ChatClient>,
    extract: ExtractOptions,
}

impl DocumentAnalyzer {
    pub fn new(remote: Option<ChatClient>, extract: ExtractOptions) -> Self {
        Self {
            remote,
            local: None,
            extract,
        }
    }

    /// Model tried when the remote one is missing or fails.
    pub fn with_local(mut self, local: Option<ChatClient>) -> Self {
        self.local = local;
        self
    }

    /// Summary of the file at `path`, at most [`MAX_SUMMARY_CHARS`] characters.
    ///
    /// Never fails: unreadable files produce [`ANALYSIS_FAILED_REPLY`].
    pub async fn summarize_file(&self, path: &Path) -> String {
        match self.try_summarize_file(path).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "document analysis failed");
                ANALYSIS_FAILED_REPLY.to_string()
            }
        }
    }

    async fn try_summarize_file(&self, path: &Path) -> Result<String, DocumentError> {
        let owned = path.to_path_buf();
        let opts = self.extract.clone();
        let extracted = tokio::task::spawn_blocking(move || extract::extract(&owned, &opts)).await??;
        info!(
            extension = %extracted.extension,
            strategy = ?extracted.strategy,
            "extracted uploaded file"
        );

        let text = normalize_whitespace(&extracted.text);
        if text.is_empty() {
            return Ok(NO_TEXT_REPLY.to_string());
        }

        let summary = self.summarize_text(&text).await;
        Ok(truncate_chars(&summary, MAX_SUMMARY_CHARS).to_string())
    }

    /// Remote model, then local model, then the extractive summary.
    pub async fn summarize_text(&self, text: &str) -> String {
        let messages = summary_messages(text);
        for (label, client) in [("remote", &self.remote), ("local", &self.local)] {
            let Some(client) = client else {
                debug!(backend = label, "summary backend not configured");
                continue;
            };
            match client.chat(&messages, SUMMARY_MAX_TOKENS).await {
                Ok(summary) => return summary,
                Err(e) => warn!(backend = label, error = %e, "model summary failed"),
            }
        }
        local_summary(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::IMAGE_FALLBACK_TEXT;
    use reqwest::Client;
    use std::path::PathBuf;
    use summary::LOCAL_SUMMARY_PREFIX;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline() -> DocumentAnalyzer {
        DocumentAnalyzer::new(None, ExtractOptions::default())
    }

    fn online(server: &MockServer) -> DocumentAnalyzer {
        DocumentAnalyzer::new(
            Some(ChatClient::with_base_url(Client::new(), &server.uri())),
            ExtractOptions::default(),
        )
    }

    fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn offline_text_file_gets_local_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", b"Sow maize in June.\n\n  Weed after   two weeks.");
        let out = offline().summarize_file(&path).await;
        assert_eq!(
            out,
            format!("{LOCAL_SUMMARY_PREFIX}Sow maize in June. Weed after two weeks.")
        );
    }

    #[tokio::test]
    async fn remote_summary_is_used_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 2000,
                "messages": summary_messages("Sow maize in June.")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Maize planting notes."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", b"Sow maize in June.");
        assert_eq!(online(&server).summarize_file(&path).await, "Maize planting notes.");
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", b"Sow maize in June.");
        let out = online(&server).summarize_file(&path).await;
        assert!(out.starts_with(LOCAL_SUMMARY_PREFIX), "got: {out}");
    }

    #[tokio::test]
    async fn local_model_summarizes_without_remote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"model": "llama3.2", "max_tokens": 2000})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Local model notes."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let local = ChatClient::new(
            Client::new(),
            &server.uri(),
            "llama3.2",
            None,
            crate::config::AppIdentity::default(),
        );
        let analyzer = offline().with_local(Some(local));

        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", b"Sow maize in June.");
        assert_eq!(analyzer.summarize_file(&path).await, "Local model notes.");
    }

    #[tokio::test]
    async fn local_model_follows_failed_remote() {
        let remote = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&remote)
            .await;
        let local = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "From the local model."}}]
            })))
            .expect(1)
            .mount(&local)
            .await;

        let analyzer = online(&remote).with_local(Some(ChatClient::with_base_url(
            Client::new(),
            &local.uri(),
        )));
        assert_eq!(
            analyzer.summarize_text("Sow maize in June.").await,
            "From the local model."
        );
    }

    #[tokio::test]
    async fn long_remote_summary_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ಅ".repeat(8000)}}]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "notes.txt", b"Some text.");
        let out = online(&server).summarize_file(&path).await;
        assert_eq!(out.chars().count(), MAX_SUMMARY_CHARS);
    }

    #[tokio::test]
    async fn whitespace_only_file_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "blank.txt", b" \n\t \r\n");
        assert_eq!(offline().summarize_file(&path).await, NO_TEXT_REPLY);
    }

    #[tokio::test]
    async fn corrupt_uploads_report_fixed_error() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["report.pdf", "letter.docx", "sheet.xlsx"] {
            let path = write(&dir, name, b"\x00\x01 definitely not a document");
            assert_eq!(offline().summarize_file(&path).await, ANALYSIS_FAILED_REPLY, "{name}");
        }
    }

    #[tokio::test]
    async fn missing_file_reports_fixed_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = offline().summarize_file(&dir.path().join("gone.csv")).await;
        assert_eq!(out, ANALYSIS_FAILED_REPLY);
    }

    #[tokio::test]
    async fn csv_prompt_carries_only_first_hundred_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Yield table."}}]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let body: String = (1..=500).map(|i| format!("plot{i},{}\n", i * 3)).collect();
        let path = write(&dir, "big.csv", body.as_bytes());
        assert_eq!(online(&server).summarize_file(&path).await, "Yield table.");

        let requests = server.received_requests().await.unwrap();
        let sent = String::from_utf8_lossy(&requests[0].body);
        assert!(sent.contains("plot100, 300"));
        assert!(!sent.contains("plot101,"));
    }

    #[tokio::test]
    async fn unreadable_image_summarizes_fallback_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "leaf.jpg", b"\xff\xd8\xff\xe0");
        let analyzer = DocumentAnalyzer::new(
            None,
            ExtractOptions {
                tesseract_cmd: "no-such-ocr-binary".into(),
            },
        );
        assert_eq!(
            analyzer.summarize_file(&path).await,
            format!("{LOCAL_SUMMARY_PREFIX}{IMAGE_FALLBACK_TEXT}")
        );
    }
}
