use tracing::debug;
use whatlang::Lang;

use super::ENGLISH;

/// Best-guess source language of a piece of text.
///
/// Implementations never fail: anything undetectable is reported as English.
pub trait DetectLanguage {
    fn detect(&self, text: &str) -> String;
}

/// Offline trigram detector backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl DetectLanguage for WhatlangDetector {
    fn detect(&self, text: &str) -> String {
        let Some(info) = whatlang::detect(text) else {
            debug!("language undetectable, assuming English");
            return ENGLISH.to_string();
        };
        if !info.is_reliable() {
            debug!(
                guess = ?info.lang(),
                confidence = info.confidence(),
                "unreliable detection, assuming English"
            );
            return ENGLISH.to_string();
        }
        let code = iso639_1(info.lang()).unwrap_or(ENGLISH);
        debug!(lang = code, confidence = info.confidence(), "language detected");
        code.to_string()
    }
}

/// Two-letter code for the languages the assistant is likely to meet.
fn iso639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Tam => "ta",
        Lang::Kan => "kn",
        Lang::Mal => "ml",
        Lang::Tel => "te",
        Lang::Mar => "mr",
        Lang::Ben => "bn",
        Lang::Guj => "gu",
        Lang::Pan => "pa",
        Lang::Ori => "or",
        Lang::Urd => "ur",
        Lang::Nep => "ne",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Rus => "ru",
        Lang::Ara => "ar",
        Lang::Jpn => "ja",
        Lang::Cmn => "zh",
        Lang::Kor => "ko",
        _ => return None,
    };
    Some(code)
}
