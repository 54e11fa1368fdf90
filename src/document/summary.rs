use std::sync::LazyLock;

use regex::Regex;

use crate::completion::Message;
use crate::text::truncate_chars;

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an intelligent summarization assistant.";
pub const SUMMARY_MAX_TOKENS: u32 = 2000;

/// Characters of extracted text sent to the model.
pub const PROMPT_TEXT_LIMIT: usize = 15_000;

/// Sentences kept by the extractive fallback.
pub const LOCAL_SENTENCES: usize = 20;

pub const LOCAL_SUMMARY_PREFIX: &str = "📄 Summary (local fallback):\n";

const LOCAL_BODY_LIMIT: usize = 5000;

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

pub fn summary_messages(text: &str) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_SYSTEM_PROMPT),
        Message::user(build_summary_prompt(text)),
    ]
}

pub fn build_summary_prompt(text: &str) -> String {
    format!(
        "Analyze and summarize the following content in a clear, concise, AI-style manner. \
         Limit the result to around 5000 characters. Preserve any important data, entities, or insights.\n\n\
         === FILE CONTENT START ===\n{}\n=== FILE CONTENT END ===",
        truncate_chars(text, PROMPT_TEXT_LIMIT)
    )
}

/// Splits after `.`, `!` or `?` when followed by whitespace; the
/// punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        // Punctuation is ASCII, so `m.start() + 1` is a char boundary.
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Extractive summary used when no model is available.
pub fn local_summary(text: &str) -> String {
    let body = split_sentences(text)
        .into_iter()
        .take(LOCAL_SENTENCES)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{LOCAL_SUMMARY_PREFIX}{}", truncate_chars(&body, LOCAL_BODY_LIMIT))
}
