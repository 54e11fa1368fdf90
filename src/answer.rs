use std::sync::Arc;

use tracing::{debug, info};

use crate::completion::{Complete, NoCompletion};
use crate::kb::{KnowledgeBase, KnowledgeEntry};
use crate::lang::{DetectLanguage, ENGLISH, Translate, normalize_code};
use crate::profile::UserProfile;

pub const EMPTY_MESSAGE_REPLY: &str = "Please ask a question about crops, soil, or pests.";
pub const NO_ANSWER_REPLY: &str =
    "I don't have that answer in KB. Try asking about a specific crop or pest.";

/// Stateless answer pipeline. Every collaborator is injected; the knowledge
/// base is shared read-only.
pub struct AnswerEngine<D, T, R, L = NoCompletion> {
    kb: Arc<KnowledgeBase>,
    detector: D,
    translator: Arc<T>,
    remote: R,
    local: L,
}

impl<D, T, R> AnswerEngine<D, T, R> {
    pub fn new(kb: Arc<KnowledgeBase>, detector: D, translator: Arc<T>, remote: R) -> Self {
        Self {
            kb,
            detector,
            translator,
            remote,
            local: NoCompletion,
        }
    }
}

impl<D, T, R, L> AnswerEngine<D, T, R, L> {
    /// Adds a fallback tier tried before `remote`.
    pub fn with_local<L2>(self, local: L2) -> AnswerEngine<D, T, R, L2> {
        AnswerEngine {
            kb: self.kb,
            detector: self.detector,
            translator: self.translator,
            remote: self.remote,
            local,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }
}

impl<D, T, R, L> AnswerEngine<D, T, R, L>
where
    D: DetectLanguage,
    T: Translate,
    R: Complete,
    L: Complete,
{
    pub async fn answer(&self, profile: &UserProfile, message: &str) -> String {
        if message.trim().is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        let detected = self.detector.detect(message);
        let english_text = if detected != ENGLISH {
            let translated = self.translator.translate(message, ENGLISH).await;
            if translated.trim().is_empty() {
                message.to_string()
            } else {
                translated
            }
        } else {
            message.to_string()
        };
        let target = response_language(profile, &detected);

        if let Some(entry) = self.kb.lookup(&english_text) {
            info!(detected = %detected, target = %target, "answered from knowledge base");
            return self.localized_answer(entry, &target).await;
        }

        debug!(detected = %detected, target = %target, "knowledge base miss, trying fallbacks");
        let local = self.local.complete(profile, &english_text, &target).await;
        if !local.is_empty() {
            info!("answered by local model");
            return local;
        }
        let remote = self.remote.complete(profile, &english_text, &target).await;
        if !remote.is_empty() {
            info!("answered by remote model");
            return remote;
        }

        info!("no answer available");
        NO_ANSWER_REPLY.to_string()
    }

    /// Picks the entry's answer for `lang`, falling back to English (translated
    /// when possible) and then to whatever slot is populated.
    async fn localized_answer(&self, entry: &KnowledgeEntry, lang: &str) -> String {
        let own = entry.answer(lang);
        if !own.is_empty() {
            return own.to_string();
        }

        let english = entry.english();
        if !english.is_empty() {
            if lang == ENGLISH {
                return english.to_string();
            }
            return self.translator.translate(english, lang).await;
        }

        entry.first_non_empty().unwrap_or_default().to_string()
    }
}

/// Preferred language when the profile has one, otherwise the detected one.
fn response_language(profile: &UserProfile, detected: &str) -> String {
    let code = profile.preferred_language().unwrap_or(detected);
    let code = normalize_code(code);
    if code.is_empty() { ENGLISH.to_string() } else { code }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::DisabledTranslator;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedDetector {
        lang: &'static str,
        calls: AtomicUsize,
    }

    impl FixedDetector {
        fn new(lang: &'static str) -> Self {
            Self {
                lang,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DetectLanguage for FixedDetector {
        fn detect(&self, _text: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.lang.to_string()
        }
    }

    /// Prefixes the destination code; records every call.
    #[derive(Default)]
    struct TaggingTranslator {
        calls: Mutex<Vec<(String, String)>>,
        to_english: Option<&'static str>,
    }

    impl TaggingTranslator {
        fn into_english(text: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                to_english: Some(text),
            }
        }

        fn captured(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Translate for TaggingTranslator {
        async fn translate(&self, text: &str, dest: &str) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), dest.to_string()));
            match (dest, self.to_english) {
                ("en", Some(english)) => english.to_string(),
                _ => format!("[{dest}] {text}"),
            }
        }
    }

    struct MockCompletion {
        reply: &'static str,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl MockCompletion {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn captured(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Complete for MockCompletion {
        async fn complete(&self, _profile: &UserProfile, english_text: &str, target_lang: &str) -> String {
            self.requests
                .lock()
                .unwrap()
                .push((english_text.to_string(), target_lang.to_string()));
            self.reply.to_string()
        }
    }

    impl Complete for &MockCompletion {
        async fn complete(&self, profile: &UserProfile, english_text: &str, target_lang: &str) -> String {
            (**self).complete(profile, english_text, target_lang).await
        }
    }

    fn aphid_kb() -> Arc<KnowledgeBase> {
        Arc::new(
            KnowledgeBase::from_json_str(
                r#"[
                    {"keywords": ["aphid"], "answer_en": "Use neem oil.", "answer_hi": "नीम के तेल का उपयोग करें."},
                    {"keywords": ["mulch"], "answer_en": "Cover the soil with straw."},
                    {"keywords": ["pongamia"], "answer_ta": "புங்கை எண்ணெய்"}
                ]"#,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn aphid_question_in_english_returns_english_answer() {
        let remote = MockCompletion::replying("should not be used");
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            &remote,
        );

        let out = engine
            .answer(&UserProfile::new(), "How to treat aphid infestation?")
            .await;
        assert_eq!(out, "Use neem oil.");
        assert!(remote.captured().is_empty());
    }

    #[tokio::test]
    async fn blank_message_short_circuits() {
        let remote = MockCompletion::replying("x");
        let translator = Arc::new(TaggingTranslator::default());
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("hi"),
            Arc::clone(&translator),
            &remote,
        );

        assert_eq!(engine.answer(&UserProfile::new(), "").await, EMPTY_MESSAGE_REPLY);
        assert_eq!(engine.answer(&UserProfile::new(), " \n\t").await, EMPTY_MESSAGE_REPLY);
        assert_eq!(engine.detector.calls.load(Ordering::SeqCst), 0);
        assert!(translator.captured().is_empty());
        assert!(remote.captured().is_empty());
    }

    #[tokio::test]
    async fn preferred_language_selects_slot() {
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            NoCompletion,
        );
        let profile = UserProfile::new().with_preferred_language("hi-IN");
        assert_eq!(
            engine.answer(&profile, "aphid on mustard").await,
            "नीम के तेल का उपयोग करें."
        );
    }

    #[tokio::test]
    async fn missing_slot_translates_english_answer() {
        let translator = Arc::new(TaggingTranslator::default());
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::clone(&translator),
            NoCompletion,
        );
        let profile = UserProfile::new().with_preferred_language("hi");

        let out = engine.answer(&profile, "Should I mulch tomatoes?").await;
        assert_eq!(out, "[hi] Cover the soil with straw.");
        assert_eq!(
            translator.captured(),
            vec![("Cover the soil with straw.".to_string(), "hi".to_string())]
        );
    }

    #[tokio::test]
    async fn missing_slot_without_translator_returns_english_verbatim() {
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            NoCompletion,
        );
        let profile = UserProfile::new().with_preferred_language("hi");
        assert_eq!(
            engine.answer(&profile, "Should I mulch tomatoes?").await,
            "Cover the soil with straw."
        );
    }

    #[tokio::test]
    async fn entry_without_english_uses_first_populated_slot() {
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            NoCompletion,
        );
        assert_eq!(
            engine.answer(&UserProfile::new(), "pongamia cake dose").await,
            "புங்கை எண்ணெய்"
        );
    }

    #[tokio::test]
    async fn non_english_message_is_normalized_before_lookup() {
        let translator = Arc::new(TaggingTranslator::into_english("How do I stop aphid attacks?"));
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("hi"),
            Arc::clone(&translator),
            NoCompletion,
        );

        let out = engine.answer(&UserProfile::new(), "माहू को कैसे रोकें?").await;
        assert_eq!(out, "नीम के तेल का उपयोग करें.");
        assert_eq!(
            translator.captured(),
            vec![("माहू को कैसे रोकें?".to_string(), "en".to_string())]
        );
    }

    #[tokio::test]
    async fn short_english_question_is_answered_untranslated() {
        let kb = Arc::new(KnowledgeBase::from_json_str(r#"{"leaf curl": "Control whiteflies."}"#).unwrap());
        let translator = Arc::new(TaggingTranslator::default());
        let engine = AnswerEngine::new(
            kb,
            crate::lang::WhatlangDetector,
            Arc::clone(&translator),
            NoCompletion,
        );

        let out = engine.answer(&UserProfile::new(), "tomato leaf curl").await;
        assert_eq!(out, "Control whiteflies.");
        assert!(translator.captured().is_empty());
    }

    #[tokio::test]
    async fn english_message_is_not_translated() {
        let translator = Arc::new(TaggingTranslator::default());
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::clone(&translator),
            NoCompletion,
        );
        engine.answer(&UserProfile::new(), "aphid help").await;
        assert!(translator.captured().is_empty());
    }

    #[tokio::test]
    async fn miss_tries_local_before_remote() {
        let local = MockCompletion::replying("local says water weekly");
        let remote = MockCompletion::replying("remote answer");
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            &remote,
        )
        .with_local(&local);

        let out = engine.answer(&UserProfile::new(), "How often to water okra?").await;
        assert_eq!(out, "local says water weekly");
        assert_eq!(
            local.captured(),
            vec![("How often to water okra?".to_string(), "en".to_string())]
        );
        assert!(remote.captured().is_empty());
    }

    #[tokio::test]
    async fn empty_local_falls_through_to_remote_with_target_language() {
        let local = MockCompletion::replying("");
        let remote = MockCompletion::replying("remote answer");
        let translator = Arc::new(TaggingTranslator::into_english("How often to water okra?"));
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("ta"),
            translator,
            &remote,
        )
        .with_local(&local);

        let out = engine.answer(&UserProfile::new(), "வெண்டைக்கு எவ்வளவு தண்ணீர்?").await;
        assert_eq!(out, "remote answer");
        assert_eq!(
            remote.captured(),
            vec![("How often to water okra?".to_string(), "ta".to_string())]
        );
    }

    #[tokio::test]
    async fn every_fallback_empty_returns_default_reply() {
        let remote = MockCompletion::replying("");
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            &remote,
        );
        assert_eq!(
            engine.answer(&UserProfile::new(), "Price of tractors?").await,
            NO_ANSWER_REPLY
        );
        assert_eq!(remote.captured().len(), 1);
    }

    #[tokio::test]
    async fn knowledge_base_path_is_deterministic() {
        let engine = AnswerEngine::new(
            aphid_kb(),
            FixedDetector::new("en"),
            Arc::new(DisabledTranslator),
            NoCompletion,
        );
        let profile = UserProfile::new();
        let first = engine.answer(&profile, "aphid and mulch").await;
        let second = engine.answer(&profile, "aphid and mulch").await;
        assert_eq!(first, second);
        assert_eq!(first, "Use neem oil.");
    }

    #[test]
    fn response_language_prefers_profile() {
        let profile = UserProfile::new().with_preferred_language("te");
        assert_eq!(response_language(&profile, "hi"), "te");
        assert_eq!(response_language(&UserProfile::new(), "ta"), "ta");
        assert_eq!(response_language(&UserProfile::new(), "pt-BR"), "pt");
    }
}
