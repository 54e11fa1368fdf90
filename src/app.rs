use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::answer::AnswerEngine;
use crate::completion::{ChatClient, Completer};
use crate::config::kb_path_from_env;
use crate::document::{DocumentAnalyzer, ExtractOptions};
use crate::kb::{KbError, KnowledgeBase};
use crate::lang::{Translator, WhatlangDetector};
use crate::profile::UserProfile;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Whole-request timeout; summaries of long documents are slow.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to load knowledge base: {0}")]
    Kb(#[from] KbError),
}

type Engine = AnswerEngine<WhatlangDetector, Translator, Completer<Translator>, Completer<Translator>>;

/// Both entry points wired from the environment.
pub struct AgroBot {
    engine: Engine,
    documents: DocumentAnalyzer,
}

impl AgroBot {
    /// `kb_path` overrides `AGROBOT_KB_PATH`.
    pub fn from_env(kb_path: Option<PathBuf>) -> Result<Self, StartupError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let kb_path = kb_path.unwrap_or_else(kb_path_from_env);
        let kb = Arc::new(KnowledgeBase::load(&kb_path)?);
        info!(path = %kb_path.display(), keywords = kb.len(), "knowledge base ready");

        let translator = Arc::new(Translator::from_env(http.clone()));
        let remote_client = ChatClient::from_env(http.clone())
            .inspect_err(|e| warn!("remote model not available: {e}"))
            .ok();
        let local_client = ChatClient::local_from_env(http);

        let remote = Completer::new(remote_client.clone(), Arc::clone(&translator), "remote");
        let local = Completer::new(local_client.clone(), Arc::clone(&translator), "local");
        info!(
            translation = translator.is_enabled(),
            remote = remote.is_enabled(),
            local = local.is_enabled(),
            "optional capabilities"
        );

        let engine = AnswerEngine::new(kb, WhatlangDetector, translator, remote).with_local(local);
        let documents =
            DocumentAnalyzer::new(remote_client, ExtractOptions::from_env()).with_local(local_client);

        Ok(Self { engine, documents })
    }

    pub async fn answer(&self, profile: &UserProfile, message: &str) -> String {
        self.engine.answer(profile, message).await
    }

    pub async fn summarize_file(&self, path: &Path) -> String {
        self.documents.summarize_file(path).await
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        self.engine.knowledge_base()
    }
}
