use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizQuestionError {
    #[error("QuizQuestion must have 3 or 4 choices, got {0}")]
    ChoiceCount(usize),

    #[error("answer_index {index} out of range for {choices} choices")]
    AnswerOutOfRange { index: usize, choices: usize },
}

/// A validated multiple-choice question.
///
/// Fields are private so every instance goes through [`QuizQuestion::new`];
/// deserialization uses the same constructor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizQuestionFields")]
pub struct QuizQuestion {
    question: String,
    choices: Vec<String>,
    answer_index: usize,
    explanation: String,
}

#[derive(Deserialize)]
struct QuizQuestionFields {
    question: String,
    choices: Vec<String>,
    answer_index: usize,
    explanation: String,
}

impl TryFrom<QuizQuestionFields> for QuizQuestion {
    type Error = QuizQuestionError;

    fn try_from(fields: QuizQuestionFields) -> Result<Self, Self::Error> {
        QuizQuestion::new(
            fields.question,
            fields.choices,
            fields.answer_index,
            fields.explanation,
        )
    }
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        choices: Vec<String>,
        answer_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuizQuestionError> {
        if !(3..=4).contains(&choices.len()) {
            return Err(QuizQuestionError::ChoiceCount(choices.len()));
        }
        if answer_index >= choices.len() {
            return Err(QuizQuestionError::AnswerOutOfRange {
                index: answer_index,
                choices: choices.len(),
            });
        }

        Ok(Self {
            question: question.into(),
            choices,
            answer_index,
            explanation: explanation.into(),
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn correct_choice(&self) -> &str {
        &self.choices[self.answer_index]
    }
}
