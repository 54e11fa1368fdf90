mod loader;
mod resolver;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

pub use loader::KbError;

/// Language slots every entry carries, in stored order.
pub const LANGUAGE_SLOTS: [&str; 6] = ["en", "hi", "ta", "ka", "ma", "te"];

/// Per-language answers for one knowledge-base topic.
///
/// Slots are always present; a missing translation is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeEntry {
    answers: [String; LANGUAGE_SLOTS.len()],
}

impl KnowledgeEntry {
    pub fn new(answers: [String; LANGUAGE_SLOTS.len()]) -> Self {
        Self { answers }
    }

    pub fn english_only(answer: impl Into<String>) -> Self {
        let mut entry = Self::default();
        entry.answers[0] = answer.into();
        entry
    }

    /// Answer stored for `lang`, or `""` when the slot is empty or unknown.
    ///
    /// ISO codes `kn` and `ml` read the `ka` and `ma` slots.
    pub fn answer(&self, lang: &str) -> &str {
        let slot = match lang {
            "kn" => "ka",
            "ml" => "ma",
            other => other,
        };
        LANGUAGE_SLOTS
            .iter()
            .position(|s| *s == slot)
            .map(|i| self.answers[i].as_str())
            .unwrap_or("")
    }

    pub fn english(&self) -> &str {
        &self.answers[0]
    }

    pub fn first_non_empty(&self) -> Option<&str> {
        self.answers
            .iter()
            .map(String::as_str)
            .find(|a| !a.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        LANGUAGE_SLOTS
            .iter()
            .copied()
            .zip(self.answers.iter().map(String::as_str))
    }
}

/// Ordered keyword table. Each keyword maps to exactly one entry; entries
/// built from the same record are shared.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    keywords: Vec<(String, Arc<KnowledgeEntry>)>,
}

impl KnowledgeBase {
    /// Loads the base from `path`. A missing file yields an empty base.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KbError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "knowledge base not found, starting empty");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let kb = Self::from_json_str(&raw)?;
        info!(path = %path.display(), keywords = kb.len(), "knowledge base loaded");
        Ok(kb)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, KbError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let mut builder = Builder::default();
        loader::collect(value, &mut |keyword, entry| builder.insert(keyword, entry));
        Ok(builder.finish())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, keyword: &str) -> Option<&KnowledgeEntry> {
        self.keywords
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, e)| e.as_ref())
    }
}

/// Accumulates keywords in first-seen order; a repeated keyword replaces the
/// earlier entry in place.
#[derive(Default)]
struct Builder {
    keywords: Vec<(String, Arc<KnowledgeEntry>)>,
    index: HashMap<String, usize>,
}

impl Builder {
    fn insert(&mut self, keyword: String, entry: Arc<KnowledgeEntry>) {
        match self.index.get(&keyword) {
            Some(&i) => self.keywords[i].1 = entry,
            None => {
                self.index.insert(keyword.clone(), self.keywords.len());
                self.keywords.push((keyword, entry));
            }
        }
    }

    fn finish(self) -> KnowledgeBase {
        KnowledgeBase {
            keywords: self.keywords,
        }
    }
}
