mod client;
pub mod types;

use std::sync::Arc;

use tracing::{debug, warn};

pub use client::{ChatClient, CompletionError};
pub use types::Message;

use crate::lang::{ENGLISH, Translate};
use crate::profile::UserProfile;

pub const ANSWER_MAX_TOKENS: u32 = 700;

const AGRONOMIST_PERSONA: &str = "You are an expert agricultural assistant helping farmers.";

/// Produces an answer for a question, or an empty string when it cannot.
///
/// Implementations swallow their own failures; an empty result tells the
/// caller to move on to the next fallback.
pub trait Complete {
    fn complete(
        &self,
        profile: &UserProfile,
        english_text: &str,
        target_lang: &str,
    ) -> impl Future<Output = String> + Send;
}

/// Fallback tier that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl Complete for NoCompletion {
    async fn complete(&self, _profile: &UserProfile, _english_text: &str, _target_lang: &str) -> String {
        String::new()
    }
}

/// Builds the persona + question prompt for an answer request.
pub fn answer_messages(profile: &UserProfile, english_text: &str) -> Vec<Message> {
    vec![
        Message::system(AGRONOMIST_PERSONA),
        Message::user(format!(
            "User profile: {profile}\nQuestion: {english_text}\nGive a clear, useful, practical answer."
        )),
    ]
}

/// Answers through a [`ChatClient`] and translates the reply into the
/// target language. Without a client it is a no-op.
#[derive(Debug, Clone)]
pub struct Completer<T> {
    client: Option<ChatClient>,
    translator: Arc<T>,
    label: &'static str,
}

impl<T> Completer<T> {
    pub fn new(client: Option<ChatClient>, translator: Arc<T>, label: &'static str) -> Self {
        Self {
            client,
            translator,
            label,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }
}

impl<T: Translate + Send + Sync> Complete for Completer<T> {
    async fn complete(&self, profile: &UserProfile, english_text: &str, target_lang: &str) -> String {
        let Some(client) = &self.client else {
            debug!(backend = self.label, "completion backend not configured");
            return String::new();
        };

        let messages = answer_messages(profile, english_text);
        match client.chat(&messages, ANSWER_MAX_TOKENS).await {
            Ok(text) if target_lang != ENGLISH => self.translator.translate(&text, target_lang).await,
            Ok(text) => text,
            Err(e) => {
                warn!(backend = self.label, error = %e, "completion fallback failed");
                String::new()
            }
        }
    }
}
