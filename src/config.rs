use std::env;
use std::path::{Path, PathBuf};

pub(crate) const KB_PATH_VAR: &str = "AGROBOT_KB_PATH";
/// Bundled knowledge base, relative to the crate root.
pub(crate) const DEFAULT_KB_PATH: &str = "data/kb.json";

const DEFAULT_APP_NAME: &str = "AgroBot Chat Assistant";
const DEFAULT_APP_URL: &str = "http://127.0.0.1:5000";

/// Reads an environment variable, treating unset and blank values alike.
pub(crate) fn env_var(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

pub(crate) fn env_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Knowledge base shipped with the crate, independent of the working directory.
pub(crate) fn default_kb_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_KB_PATH)
}

/// `AGROBOT_KB_PATH` when set, else [`default_kb_path`].
pub(crate) fn kb_path_from_env() -> PathBuf {
    env_var(KB_PATH_VAR).map_or_else(default_kb_path, PathBuf::from)
}

/// Credential wrapper that keeps secrets out of `Debug` output.
#[derive(Clone)]
pub(crate) struct ApiKey(pub(crate) String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Name and URL sent as `X-Title` / `HTTP-Referer` on completion requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub url: String,
}

impl AppIdentity {
    pub fn from_env() -> Self {
        Self {
            name: env_or("APP_NAME", DEFAULT_APP_NAME),
            url: env_or("APP_URL", DEFAULT_APP_URL),
        }
    }
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            url: DEFAULT_APP_URL.to_string(),
        }
    }
}
