//! Prompt rendering.
//!
//! Rendering is a pure function of `(task, input_text, context)`. Inputs are
//! substituted verbatim: prompts are natural-language instructions, not a
//! machine format, so nothing is escaped.

use crate::request::{CONTEXT_LANGUAGE, CONTEXT_PRODUCT_NAME, Context};
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Stand-in used when no product name was supplied.
pub const DEFAULT_PRODUCT: &str = "Product";

/// Instruction used for missing or unrecognised language codes.
pub const SAME_LANGUAGE_INSTRUCTION: &str = "Respond in the same language as the input text. ";

const LANGUAGE_INSTRUCTIONS: &[(&str, &str)] = &[
    ("en", ""),
    ("es", "Respond in Spanish. "),
    ("fr", "Respond in French. "),
    ("de", "Respond in German. "),
    ("it", "Respond in Italian. "),
    ("pt", "Respond in Portuguese. "),
    ("zh-cn", "Respond in Chinese. "),
    ("zh-tw", "Respond in Chinese. "),
    ("ja", "Respond in Japanese. "),
    ("ko", "Respond in Korean. "),
    ("ar", "Respond in Arabic. "),
    ("hi", "Respond in Hindi. "),
    ("ur", "Respond in Urdu. "),
];

/// A rendered prompt for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub task: Task,
    pub rendered_text: String,
}

/// Returns the response-language prefix for a short language code.
#[must_use]
pub fn language_instruction(code: Option<&str>) -> &'static str {
    let Some(code) = code else {
        return SAME_LANGUAGE_INSTRUCTION;
    };
    let code = code.trim().to_ascii_lowercase();
    LANGUAGE_INSTRUCTIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(SAME_LANGUAGE_INSTRUCTION, |(_, instruction)| *instruction)
}

/// Renders the prompt for `task` over `input_text`.
#[must_use]
pub fn build_prompt(task: Task, input_text: &str, context: &Context) -> PromptSpec {
    let product = context
        .get(CONTEXT_PRODUCT_NAME)
        .map(String::as_str)
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PRODUCT);

    let body = match task {
        Task::Sentiment => format!(
            "Analyze the sentiment of this review for the {product}.\n\
             Rules:\n\
             - Return 'Positive' if the review is mostly happy or praising.\n\
             - Return 'Negative' if the review is mostly unhappy or complaining.\n\
             - Return 'Neutral' if the review mentions BOTH pros and cons (mixed), or is indifferent.\n\
             Review: {input_text}\n\n\
             Answer with ONE word: Positive, Negative, or Neutral."
        ),
        Task::Topic => format!(
            "What is the main topic (e.g., Battery, Screen, Price, Service, Quality, Delivery) \
             of this review for the {product}? Answer efficiently in 1-3 words.\n\n\
             Review: {input_text}"
        ),
        Task::Summary => format!(
            "Summarize this review of the {product} in one concise sentence.\n\n\
             Review: {input_text}"
        ),
        Task::Brief => format!("Summarize this text in 2-3 sentences:\n\n{input_text}"),
        Task::Detailed => format!(
            "Provide a comprehensive summary of this text, covering all main points:\n\n{input_text}"
        ),
        Task::Bullets => format!(
            "Summarize this text as bullet points (use - for each point):\n\n{input_text}"
        ),
    };

    let rendered_text = if task.is_summary_mode() {
        let language = context.get(CONTEXT_LANGUAGE).map(String::as_str);
        format!("{}{body}", language_instruction(language))
    } else {
        body
    };

    PromptSpec {
        task,
        rendered_text,
    }
}
