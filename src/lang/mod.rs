mod detect;
mod translate;

pub use detect::{DetectLanguage, WhatlangDetector};
pub use translate::{DisabledTranslator, HttpTranslator, Translate, TranslateError, Translator};

pub const ENGLISH: &str = "en";

/// Truncates a language code to its first two characters (`pt-BR` → `pt`).
pub fn normalize_code(code: &str) -> String {
    code.trim().chars().take(2).collect::<String>().to_lowercase()
}
