use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{KnowledgeBase, KnowledgeEntry};

/// Message tokens shorter than this never anchor a token match.
const MIN_TOKEN_CHARS: usize = 4;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

impl KnowledgeBase {
    /// Finds the entry for a free-text message.
    ///
    /// Pass one returns the first keyword (in load order) contained in the
    /// lowercased message. Pass two returns the first keyword sharing a word
    /// with the message, counting only message words of four or more
    /// characters.
    pub fn lookup(&self, message: &str) -> Option<&KnowledgeEntry> {
        let lowered = message.to_lowercase();

        if let Some((keyword, entry)) = self
            .keywords
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
        {
            debug!(keyword = %keyword, "knowledge base substring match");
            return Some(entry.as_ref());
        }

        let tokens: Vec<&str> = words(&lowered)
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let (keyword, entry) = self
            .keywords
            .iter()
            .find(|(keyword, _)| words(keyword).any(|kt| tokens.contains(&kt)))?;
        debug!(keyword = %keyword, "knowledge base token match");
        Some(entry.as_ref())
    }
}
