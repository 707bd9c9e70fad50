//! Turns free-form completion text into validated, de-duplicated questions.

pub mod dedup;
pub mod parser;
pub mod rules;
pub mod text;
pub mod validator;

pub use dedup::{full_signature, question_signature, starter, DuplicateKind, FingerprintSet};
pub use parser::parse_quiz_blocks;
pub use rules::{BlockMisconceptionQuestions, ExamRule, RuleInput, RuleOutcome, RuleSet};
pub use validator::{CandidateValidator, Rejection, DEFAULT_EXPLANATION};
