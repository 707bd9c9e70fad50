//! Parser for the delimiter-based block format the model is asked to produce:
//!
//! ```text
//! Q: <question>
//! A) <choice>
//! B) <choice>
//! C) <choice>
//! D) <choice>
//! ANSWER: <letter>
//! EXPLAIN: <sentence>
//! ---
//! ```
//!
//! Model output is never trusted to follow it. Blocks that are missing any
//! required part are dropped whole; the parser itself never fails.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::RawCandidate;
use crate::services::quiz_pipeline::text::remove_control_chars;

static QUESTION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\d+[).\-]\s*)?Q\s*[:\-—]\s*(.+?)\s*$")
        .expect("QUESTION_LINE is a valid regex pattern")
});

static CHOICE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-•]\s*)?([A-D])[).:]\s*(.+?)\s*$")
        .expect("CHOICE_LINE is a valid regex pattern")
});

static ANSWER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:ANSWER|ANS|CORRECT(?:\s+ANSWER)?)\s*[:\-—]\s*([A-D])(?:\s*[).:])?(?:\s+.*)?\s*$",
    )
    .expect("ANSWER_LINE is a valid regex pattern")
});

static EXPLANATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:EXPLAIN|EXPLANATION|RATIONALE|WHY)\s*[:\-—]\s*(.+?)\s*$")
        .expect("EXPLANATION_LINE is a valid regex pattern")
});

static SEPARATOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:---+|###)\s*$").expect("SEPARATOR_LINE is a valid regex pattern")
});

const INLINE_SEPARATOR: &str = "---";

/// Letters a block must provide, in order, for the given choice count.
pub fn expected_letters(expected_choices: usize) -> Vec<char> {
    ['A', 'B', 'C', 'D']
        .into_iter()
        .take(expected_choices)
        .collect()
}

fn first_letter(capture: &str) -> Option<char> {
    capture.chars().next().map(|c| c.to_ascii_uppercase())
}

/// Removes a separator glued to the end of a content line.
///
/// Returns the remaining text and whether a separator was found.
fn strip_inline_separator(line: &str) -> (&str, bool) {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix(INLINE_SEPARATOR) {
        Some(rest) => (rest.trim_end(), true),
        None => (line, false),
    }
}

#[derive(Default)]
struct BlockAccumulator {
    question: Option<String>,
    choices: BTreeMap<char, String>,
    answer: Option<char>,
    explanation: Option<String>,
}

impl BlockAccumulator {
    fn is_open(&self) -> bool {
        self.question.is_some()
    }

    /// Emits the block if complete, then resets.
    fn flush(&mut self, letters: &[char], out: &mut Vec<RawCandidate>) {
        let block = std::mem::take(self);

        let Some(question) = block.question.filter(|q| !q.is_empty()) else {
            return;
        };
        if letters.iter().any(|l| !block.choices.contains_key(l)) {
            return;
        }
        let Some(answer) = block.answer.filter(|a| letters.contains(a)) else {
            return;
        };

        let choices = block
            .choices
            .into_iter()
            .filter(|(letter, _)| letters.contains(letter))
            .collect();

        out.push(RawCandidate {
            question,
            choices,
            answer_letter: Some(answer),
            explanation: block.explanation,
        });
    }
}

fn is_structural_line(line: &str) -> bool {
    QUESTION_LINE.is_match(line)
        || CHOICE_LINE.is_match(line)
        || ANSWER_LINE.is_match(line)
        || SEPARATOR_LINE.is_match(line)
        || EXPLANATION_LINE.is_match(line)
}

/// Turns raw completion text into complete candidate blocks.
pub fn parse_quiz_blocks(text: &str, expected_choices: usize) -> Vec<RawCandidate> {
    let normalized = remove_control_chars(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let letters = expected_letters(expected_choices);
    let mut out = Vec::new();
    let mut block = BlockAccumulator::default();

    for raw_line in normalized.split('\n') {
        if SEPARATOR_LINE.is_match(raw_line) {
            block.flush(&letters, &mut out);
            continue;
        }

        let (line, inline_separator) = strip_inline_separator(raw_line.trim_end());

        if let Some(caps) = QUESTION_LINE.captures(line) {
            if block.is_open() {
                block.flush(&letters, &mut out);
            }
            block.question = Some(caps[1].trim().to_string());
        } else if let Some(caps) = CHOICE_LINE.captures(line) {
            if let Some(letter) = first_letter(&caps[1]) {
                block.choices.insert(letter, caps[2].trim().to_string());
            }
        } else if let Some(caps) = ANSWER_LINE.captures(line) {
            block.answer = first_letter(&caps[1]);
        } else if let Some(caps) = EXPLANATION_LINE.captures(line) {
            block.explanation = Some(caps[1].trim().to_string());
        } else if let Some(explanation) = block.explanation.as_mut() {
            let continuation = line.trim();
            if !continuation.is_empty() && !is_structural_line(line) {
                explanation.push(' ');
                explanation.push_str(continuation);
            }
        }

        if inline_separator {
            block.flush(&letters, &mut out);
        }
    }

    block.flush(&letters, &mut out);
    out
}
