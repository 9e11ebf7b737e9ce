//! Rule table used to tell conversational prose apart from editor chrome.
//!
//! The editor offers no extraction API, so every visible text block under a
//! candidate container is run through the same ordered checks: length, word
//! count, the blacklist below, then a crude "looks like a sentence" test.
//! Anything that fails is dropped; a markup change therefore yields fewer
//! records, never mislabeled ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::Role;

pub const MIN_CHARS: usize = 20;
pub const MIN_WORDS: usize = 4;
/// Accepted prose must have strictly more words than this.
pub const PROSE_MIN_WORDS: usize = 5;

/// Ordered (pattern, reason) pairs. First match wins.
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    (r"(?i)^\s*\d{1,2}:\d{2}(:\d{2})?\s*(am|pm)?\s*$", "timestamp"),
    (
        r"(?i)^\s*(just now|\d+\s*(s|secs?|seconds?|m|mins?|minutes?|h|hrs?|hours?|d|days?)\s+ago)\s*$",
        "relative timestamp",
    ),
    (
        r"(?i)^\s*(submit|cancel|accept|accept all|reject|reject all|copy|copy code|retry|send|run|stop|apply|undo|redo|open|close|review changes|good response|bad response|show more|show less|show details|hide details|expand all|collapse all|planning|fast)\s*$",
        "ui label",
    ),
    (
        r"(?i)^\s*(gemini|claude|gpt|o\d)([\s\-]+(\d[\w.]*|pro|flash|lite|sonnet|opus|haiku|thinking|high|low|medium|mini|preview|oss|\((thinking|high|low|medium)\)))*\s*$",
        "model name",
    ),
    (
        r"(?i)^\s*(thinking|generating|loading|running|working|analyzing|searching|executing)\b.{0,40}(\.\.\.|…)\s*$",
        "status phrase",
    ),
    (
        r"(?i)^\s*(thought|worked|ran)\s+for\s+\d+\s*(s|secs?|seconds?|m|mins?|minutes?)\b",
        "status phrase",
    ),
    (
        r"(?i)^\s*\d+\s+(files?|changes?)\s+(changed|edited|modified)",
        "change summary",
    ),
    (
        r"(?i)(ask anything|@ to mention|/ for (workflows|commands)|press enter to send|shift\s*\+\s*enter|drag and drop|add context)",
        "boilerplate hint",
    ),
    (
        r"(?i)\b(model quota|credits remaining|rate limit(ed)?)\b",
        "quota notice",
    ),
    (r"(?i)^\s*(ctrl|cmd|alt|shift|⌘)\s*\+", "keyboard hint"),
];

static STANDARD: LazyLock<TextClassifier> = LazyLock::new(|| {
    TextClassifier::from_rules(DEFAULT_RULES).expect("built-in classification rules compile")
});

#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub pattern: Regex,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct TextClassifier {
    rules: Vec<ClassificationRule>,
}

impl TextClassifier {
    pub fn from_rules(rules: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(pattern, reason)| {
                Ok(ClassificationRule {
                    pattern: Regex::new(pattern)?,
                    reason: (*reason).to_string(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Shared instance built from [`DEFAULT_RULES`].
    pub fn standard() -> &'static TextClassifier {
        &STANDARD
    }

    pub fn classify(&self, text: &str) -> Verdict {
        let text = text.trim();
        if text.chars().count() < MIN_CHARS {
            return Verdict::Rejected("too short".to_string());
        }
        let words = text.split_whitespace().count();
        if words < MIN_WORDS {
            return Verdict::Rejected("too few words".to_string());
        }
        if let Some(rule) = self.rules.iter().find(|r| r.pattern.is_match(text)) {
            return Verdict::Rejected(rule.reason.clone());
        }
        if !has_sentence_punctuation(text) || words <= PROSE_MIN_WORDS {
            return Verdict::Rejected("not prose".to_string());
        }
        Verdict::Accepted
    }
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::standard().clone()
    }
}

fn has_sentence_punctuation(text: &str) -> bool {
    text.contains(['.', '!', '?'])
}

/// Role from an element's class/attribute metadata.
pub fn role_from_class_meta(meta: &str) -> Role {
    let meta = meta.to_ascii_lowercase();
    if meta.contains("user") || meta.contains("human") {
        Role::User
    } else {
        Role::Agent
    }
}

/// Cut `text` to at most `max_chars` characters. Returns whether it was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
