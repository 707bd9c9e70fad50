//! Text cleaning and token-set helpers shared by the parser, validator and
//! duplicate detector.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f]").expect("CONTROL_CHARS is a valid regex pattern")
});

static CHOICE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[ABCD][).:\-]\s*|[-•]\s*)").expect("CHOICE_PREFIX is a valid regex pattern")
});

static CORRECT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\(\s*correct\s*\)\s*$").expect("CORRECT_TAG is a valid regex pattern")
});

static TRAILING_PARENTHETICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\([^)]*\)\s*$").expect("TRAILING_PARENTHETICAL is a valid regex pattern")
});

const TRAILING_PUNCTUATION: &[char] = &[' ', '.', ';', ':', ','];

const OPTION_STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "and", "or", "in", "on", "for", "with", "as", "is", "are",
    "does", "do", "which", "what", "when", "where", "who", "why", "how", "most", "best",
    "primarily", "generally",
];

const QUESTION_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "to", "of", "in", "on", "for", "with", "by", "at", "from",
    "is", "are", "was", "were", "be", "been", "being", "this", "that", "these", "those", "what",
    "which", "who", "when", "where", "why", "how",
];

pub fn remove_control_chars(text: &str) -> String {
    CONTROL_CHARS.replace_all(text, "").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips control characters and collapses all whitespace runs to one space.
pub fn clean_text(text: &str) -> String {
    collapse_whitespace(&remove_control_chars(text))
}

/// Hard cap on characters, no ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Keeps the cleaned text up to and including the first sentence terminator
/// that is followed by whitespace.
pub fn first_sentence(text: &str) -> String {
    let cleaned = clean_text(text);
    let mut chars = cleaned.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some((_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return cleaned[..idx + c.len_utf8()].trim().to_string();
                }
            }
        }
    }

    cleaned
}

pub fn strip_choice_prefix(text: &str) -> String {
    CHOICE_PREFIX.replace(text, "").trim().to_string()
}

fn normalize_choice_once(text: &str, max_len: usize) -> String {
    let cleaned = clean_text(text);
    let unquoted = cleaned.trim_matches(|c| c == '"' || c == '\'');
    let stripped = strip_choice_prefix(unquoted);
    if stripped.is_empty() {
        return String::new();
    }

    let untagged = CORRECT_TAG.replace(&stripped, "");
    let trimmed = collapse_whitespace(untagged.trim_end_matches(TRAILING_PUNCTUATION));
    let without_paren = TRAILING_PARENTHETICAL.replace(&trimmed, "");

    truncate_chars(&without_paren, max_len)
}

/// Normalizes a choice label for display.
///
/// Every step only removes characters, so the single pass is repeated until
/// it reaches a fixpoint; normalizing an already normalized choice is a no-op.
pub fn normalize_choice(text: &str, max_len: usize) -> String {
    let mut current = normalize_choice_once(text, max_len);
    loop {
        let next = normalize_choice_once(&current, max_len);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Caps a choice to at most `max_words` words.
pub fn short_label(text: &str, max_words: usize) -> String {
    let cleaned = strip_choice_prefix(&clean_text(text));
    let trimmed = cleaned.trim_end_matches(TRAILING_PUNCTUATION);

    trimmed
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(TRAILING_PUNCTUATION)
        .to_string()
}

fn ascii_alnum_lowercase(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn token_set(text: &str, stopwords: &[&str]) -> HashSet<String> {
    ascii_alnum_lowercase(text)
        .split_whitespace()
        .filter(|t| t.len() > 2 && !stopwords.contains(t))
        .map(str::to_string)
        .collect()
}

pub fn option_tokens(text: &str) -> HashSet<String> {
    token_set(text, OPTION_STOPWORDS)
}

pub fn question_tokens(text: &str) -> HashSet<String> {
    token_set(text, QUESTION_STOPWORDS)
}

/// Intersection over union; 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

pub fn option_overlap(a: &str, b: &str) -> f64 {
    jaccard(&option_tokens(a), &option_tokens(b))
}

pub fn question_similarity(a: &str, b: &str) -> f64 {
    jaccard(&question_tokens(a), &question_tokens(b))
}

/// Lowercased, whitespace-collapsed topic used as a storage key.
pub fn normalize_topic(topic: &str) -> String {
    collapse_whitespace(topic).to_lowercase()
}
