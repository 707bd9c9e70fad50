use std::collections::HashSet;

use thiserror::Error;

use crate::config::GenerationSettings;
use crate::models::domain::{QuizQuestion, RawCandidate};
use crate::services::quiz_pipeline::parser::expected_letters;
use crate::services::quiz_pipeline::rules::{RuleInput, RuleOutcome, RuleSet};
use crate::services::quiz_pipeline::text::{
    clean_text, first_sentence, normalize_choice, option_overlap, short_label, truncate_chars,
};

pub const DEFAULT_EXPLANATION: &str =
    "Prefer safe verification and clear evidence before concluding impact.";

const CORRECT_MARKER: &str = "(correct)";

/// Why a candidate was not upgraded to a [`QuizQuestion`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("question is {0} chars, over the limit")]
    QuestionTooLong(usize),
    #[error("expected {expected} choices, got {got}")]
    ChoiceCount { expected: usize, got: usize },
    #[error("choice {0} is empty after normalization")]
    EmptyChoice(usize),
    #[error("choices are not unique")]
    DuplicateChoices,
    #[error("answer letter missing or out of range")]
    InvalidAnswer,
    #[error("choices {0} and {1} overlap ({2:.2})")]
    OverlappingChoices(usize, usize, f64),
    #[error("correct choice is conspicuously longer than the others")]
    LengthGiveaway,
    #[error("rule rejected: {0}")]
    Rule(String),
    #[error("correct marker leaked into a choice")]
    LeakedMarker,
}

pub struct CandidateValidator {
    settings: GenerationSettings,
    rules: RuleSet,
}

impl CandidateValidator {
    pub fn new(settings: GenerationSettings, rules: RuleSet) -> Self {
        Self { settings, rules }
    }

    pub fn validate(&self, raw: &RawCandidate) -> Result<QuizQuestion, Rejection> {
        let settings = &self.settings;
        let expected = settings.expected_choices;

        let question = clean_text(&raw.question);
        if question.is_empty() {
            return Err(Rejection::EmptyQuestion);
        }
        let question_len = question.chars().count();
        if question_len > settings.max_question_len {
            return Err(Rejection::QuestionTooLong(question_len));
        }

        let explanation = raw
            .explanation
            .as_deref()
            .map(|e| truncate_chars(&first_sentence(e), settings.max_explanation_len))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

        if raw.choices.len() != expected {
            return Err(Rejection::ChoiceCount {
                expected,
                got: raw.choices.len(),
            });
        }

        let mut choices = Vec::with_capacity(expected);
        for (idx, choice) in raw.ordered_choices().into_iter().enumerate() {
            let normalized = normalize_choice(choice, settings.max_choice_len);
            let label = short_label(&normalized, settings.max_choice_words);
            if normalized.is_empty() || label.is_empty() {
                return Err(Rejection::EmptyChoice(idx));
            }
            choices.push(label);
        }

        let unique: HashSet<String> = choices.iter().map(|c| c.to_lowercase()).collect();
        if unique.len() != expected {
            return Err(Rejection::DuplicateChoices);
        }

        let answer_index = raw
            .answer_letter
            .and_then(|letter| expected_letters(expected).iter().position(|l| *l == letter))
            .filter(|idx| *idx < choices.len())
            .ok_or(Rejection::InvalidAnswer)?;

        for i in 0..choices.len() {
            for j in (i + 1)..choices.len() {
                let overlap = option_overlap(&choices[i], &choices[j]);
                if overlap >= settings.option_overlap_threshold {
                    return Err(Rejection::OverlappingChoices(i, j, overlap));
                }
            }
        }

        if is_length_giveaway(&choices, answer_index, settings.length_giveaway_ratio) {
            return Err(Rejection::LengthGiveaway);
        }

        let outcome = self.rules.check(&RuleInput {
            question: &question,
            choices: &choices,
            answer_index,
            explanation: &explanation,
        });
        if let RuleOutcome::Reject(reason) = outcome {
            return Err(Rejection::Rule(reason));
        }

        if choices
            .iter()
            .any(|c| c.to_lowercase().contains(CORRECT_MARKER))
        {
            return Err(Rejection::LeakedMarker);
        }

        QuizQuestion::new(question, choices, answer_index, explanation)
            .map_err(|_| Rejection::InvalidAnswer)
    }
}

/// True when the correct choice is longer than `ratio` times the mean length
/// of the other choices.
pub fn is_length_giveaway(choices: &[String], answer_index: usize, ratio: f64) -> bool {
    if choices.len() < 2 || answer_index >= choices.len() {
        return false;
    }
    let lengths: Vec<usize> = choices.iter().map(|c| c.chars().count()).collect();
    let others: usize = lengths.iter().sum::<usize>() - lengths[answer_index];
    let mean_other = others as f64 / (choices.len() - 1) as f64;

    mean_other > 0.0 && lengths[answer_index] as f64 > ratio * mean_other
}
