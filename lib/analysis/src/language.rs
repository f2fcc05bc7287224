//! Input language detection.
//!
//! Summary prompts carry a response-language prefix keyed by a short code.
//! When a caller does not name a language, it is detected from the text.

use whatlang::Lang;

/// Detects the language of `text` and returns its short code.
///
/// Languages with a dedicated prompt prefix map to the codes the prompt
/// builder knows (`fr`, `zh-cn`, ...); any other language is reported by its
/// ISO 639-3 code. Returns `None` when detection is not reliable.
#[must_use]
pub fn detect_language(text: &str) -> Option<&'static str> {
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }

    let code = match info.lang() {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Cmn => "zh-cn",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Urd => "ur",
        other => other.code(),
    };
    Some(code)
}
