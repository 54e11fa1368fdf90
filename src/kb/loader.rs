use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::KnowledgeEntry;

#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-language answer fields shared by both document shapes.
#[derive(Debug, Default, Deserialize)]
struct AnswerFields {
    answer_en: Option<String>,
    answer_hi: Option<String>,
    answer_ta: Option<String>,
    answer_ka: Option<String>,
    answer_ma: Option<String>,
    answer_te: Option<String>,
}

impl From<AnswerFields> for KnowledgeEntry {
    fn from(f: AnswerFields) -> Self {
        KnowledgeEntry::new([
            f.answer_en.unwrap_or_default(),
            f.answer_hi.unwrap_or_default(),
            f.answer_ta.unwrap_or_default(),
            f.answer_ka.unwrap_or_default(),
            f.answer_ma.unwrap_or_default(),
            f.answer_te.unwrap_or_default(),
        ])
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Keywords {
    /// Comma-separated list.
    Joined(String),
    List(Vec<String>),
}

impl Keywords {
    fn into_vec(self) -> Vec<String> {
        match self {
            Keywords::Joined(s) => s
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            Keywords::List(list) => list,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    keywords: Option<Keywords>,
    #[serde(flatten)]
    answers: AnswerFields,
}

/// Walks either supported document shape and reports each keyword with its
/// entry, in document order. Unusable records are skipped with a warning.
pub(super) fn collect(value: Value, emit: &mut impl FnMut(String, Arc<KnowledgeEntry>)) {
    match value {
        Value::Array(records) => {
            for (i, raw) in records.into_iter().enumerate() {
                let record: Record = match serde_json::from_value(raw) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(index = i, error = %e, "skipping invalid knowledge base record");
                        continue;
                    }
                };
                let keywords = record.keywords.map(Keywords::into_vec).unwrap_or_default();
                let entry = Arc::new(KnowledgeEntry::from(record.answers));
                for keyword in keywords {
                    emit_keyword(&keyword, &entry, emit);
                }
            }
        }
        Value::Object(terms) => {
            for (term, raw) in terms {
                let entry = match raw {
                    Value::String(answer) => KnowledgeEntry::english_only(answer),
                    Value::Object(_) => match serde_json::from_value::<AnswerFields>(raw) {
                        Ok(fields) => fields.into(),
                        Err(e) => {
                            warn!(term = %term, error = %e, "skipping invalid knowledge base term");
                            continue;
                        }
                    },
                    _ => {
                        warn!(term = %term, "skipping knowledge base term with non-text value");
                        continue;
                    }
                };
                emit_keyword(&term, &Arc::new(entry), emit);
            }
        }
        _ => warn!("knowledge base is neither a list nor an object, ignoring"),
    }
}

fn emit_keyword(
    keyword: &str,
    entry: &Arc<KnowledgeEntry>,
    emit: &mut impl FnMut(String, Arc<KnowledgeEntry>),
) {
    // An empty keyword is a substring of every message.
    if keyword.trim().is_empty() {
        return;
    }
    emit(keyword.to_lowercase(), Arc::clone(entry));
}
