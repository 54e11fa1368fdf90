use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const PREFERRED_LANGUAGE: &str = "preferred_language";

/// Caller-owned key-value bag describing the user asking a question.
///
/// Only `preferred_language` is interpreted; every other attribute is passed
/// through verbatim into completion prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(BTreeMap<String, Value>);

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferred_language(mut self, code: impl Into<String>) -> Self {
        self.0
            .insert(PREFERRED_LANGUAGE.to_string(), Value::String(code.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn preferred_language(&self) -> Option<&str> {
        self.0
            .get(PREFERRED_LANGUAGE)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
