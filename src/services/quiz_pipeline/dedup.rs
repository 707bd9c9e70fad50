//! Exact and near-duplicate detection within one generation run.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::domain::QuizQuestion;
use crate::services::quiz_pipeline::text::{clean_text, collapse_whitespace, question_similarity};

static NON_ALNUM_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9\s]").expect("NON_ALNUM_SPACE is a valid regex pattern")
});

static WORD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("WORD_RUN is a valid regex pattern"));

const SIGNATURE_HEX_LEN: usize = 16;
const STARTER_WORDS: usize = 3;

fn short_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..SIGNATURE_HEX_LEN].to_string()
}

/// Signature over the question and every choice, in order.
pub fn full_signature(question: &str, choices: &[String]) -> String {
    let mut payload = clean_text(question).to_lowercase();
    for choice in choices {
        payload.push_str("||");
        payload.push_str(&clean_text(choice).to_lowercase());
    }
    short_hash(&payload)
}

/// Signature over the question alone, insensitive to punctuation.
pub fn question_signature(question: &str) -> String {
    let lowered = clean_text(question).to_lowercase();
    let stripped = NON_ALNUM_SPACE.replace_all(&lowered, "");
    short_hash(&collapse_whitespace(&stripped))
}

/// First three alphanumeric words of the lowercased question.
pub fn starter(question: &str) -> String {
    let lowered = question.to_lowercase();
    WORD_RUN
        .find_iter(&lowered)
        .take(STARTER_WORDS)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DuplicateKind {
    #[error("exact duplicate of an accepted question")]
    FullSignature,
    #[error("same question text as an accepted question")]
    QuestionSignature,
    #[error("same opening words as an accepted question")]
    Starter,
    #[error("too similar to an accepted question ({0:.2})")]
    NearDuplicate(f64),
}

/// Fingerprints of every question accepted so far in one run.
#[derive(Debug, Clone)]
pub struct FingerprintSet {
    similarity_threshold: f64,
    full: HashSet<String>,
    questions: HashSet<String>,
    starters: HashSet<String>,
    texts: Vec<String>,
}

impl FingerprintSet {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
            full: HashSet::new(),
            questions: HashSet::new(),
            starters: HashSet::new(),
            texts: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn check(&self, question: &QuizQuestion) -> Result<(), DuplicateKind> {
        if self
            .full
            .contains(&full_signature(question.question(), question.choices()))
        {
            return Err(DuplicateKind::FullSignature);
        }
        if self.questions.contains(&question_signature(question.question())) {
            return Err(DuplicateKind::QuestionSignature);
        }
        let opening = starter(question.question());
        if !opening.is_empty() && self.starters.contains(&opening) {
            return Err(DuplicateKind::Starter);
        }

        for accepted in &self.texts {
            let similarity = question_similarity(accepted, question.question());
            if similarity >= self.similarity_threshold {
                return Err(DuplicateKind::NearDuplicate(similarity));
            }
        }

        Ok(())
    }

    /// Checks the question and, when it is new, records its fingerprints.
    pub fn try_accept(&mut self, question: &QuizQuestion) -> Result<(), DuplicateKind> {
        self.check(question)?;

        self.full
            .insert(full_signature(question.question(), question.choices()));
        self.questions
            .insert(question_signature(question.question()));
        let opening = starter(question.question());
        if !opening.is_empty() {
            self.starters.insert(opening);
        }
        self.texts.push(question.question().to_string());
        Ok(())
    }
}
