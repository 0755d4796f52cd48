//! Lesson enforcement: post-processes generated advice so it visibly obeys
//! the newest reflection.
//!
//! Two rules, both driven by the single most recent lesson:
//! 1. If the reply does not acknowledge past feedback, prepend an acknowledgment
//!    quoting the lesson.
//! 2. If the lesson asks for brevity and not for detail, cap the reply at
//!    `MAX_CONCISE_WORDS` words. The cut is a plain word slice and may end mid-sentence.

pub const ACK_MARKER: &str = "📌";
pub const MAX_CONCISE_WORDS: usize = 150;
pub const SHORTENED_NOTICE: &str =
    "...\n\n[Response shortened based on your feedback for brevity]";

const LESSON_QUOTE_CHARS: usize = 100;
const ACK_PHRASES: &[&str] = &["past feedback", "learning from"];
const CONCISE_KEYWORDS: &[&str] = &["concise", "shorter", "brief"];
const DETAILED_KEYWORDS: &[&str] = &[
    "long",
    "detailed",
    "comprehensive",
    "more information",
    "more detail",
];

/// Length signals found in a lesson. Plain substring checks on the lowercased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPreference {
    pub needs_concise: bool,
    pub needs_detailed: bool,
}

impl LengthPreference {
    pub fn from_lesson(lesson: &str) -> Self {
        let lower = lesson.to_lowercase();
        Self {
            needs_concise: CONCISE_KEYWORDS.iter().any(|k| lower.contains(k)),
            needs_detailed: DETAILED_KEYWORDS.iter().any(|k| lower.contains(k)),
        }
    }

    /// Detail wins over brevity when a lesson mentions both.
    pub fn enforces_word_limit(&self) -> bool {
        self.needs_concise && !self.needs_detailed
    }
}

pub fn has_acknowledgment(text: &str) -> bool {
    if text.contains(ACK_MARKER) {
        return true;
    }
    let lower = text.to_lowercase();
    ACK_PHRASES.iter().any(|p| lower.contains(p))
}

pub fn acknowledge_lesson(response: &str, lesson: &str) -> String {
    let quoted: String = lesson.chars().take(LESSON_QUOTE_CHARS).collect();
    format!(
        "{ACK_MARKER} Learning from past feedback: {quoted}...\n\nHere's my adapted approach:\n\n{response}"
    )
}

/// Keeps the first `max_words` whitespace-separated words and appends the notice.
/// Returns `None` when the text is already within the limit.
pub fn truncate_words(text: &str, max_words: usize) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return None;
    }
    Some(format!("{}{SHORTENED_NOTICE}", words[..max_words].join(" ")))
}

/// What enforcement did to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enforced {
    pub text: String,
    pub acknowledged: bool,
    /// Original word count when the reply was cut.
    pub truncated_from: Option<usize>,
}

/// Applies both rules for `latest_lesson`. With no lesson the reply is untouched.
pub fn enforce_lessons(response: String, latest_lesson: Option<&str>) -> Enforced {
    let Some(lesson) = latest_lesson else {
        return Enforced {
            text: response,
            acknowledged: false,
            truncated_from: None,
        };
    };

    let mut text = response;
    let mut acknowledged = false;
    if !has_acknowledgment(&text) {
        text = acknowledge_lesson(&text, lesson);
        acknowledged = true;
    }

    let mut truncated_from = None;
    if LengthPreference::from_lesson(lesson).enforces_word_limit() {
        let word_count = text.split_whitespace().count();
        if let Some(short) = truncate_words(&text, MAX_CONCISE_WORDS) {
            text = short;
            truncated_from = Some(word_count);
        }
    }

    Enforced {
        text,
        acknowledged,
        truncated_from,
    }
}
