use serde::{Deserialize, Serialize};

use crate::models::domain::QuizQuestion;

/// Wire shape of a generated question, with the answer letter spelled out
/// for clients that render `A)`..`D)` labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestionDto {
    pub question: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
    pub answer_letter: char,
    pub explanation: String,
}

impl From<QuizQuestion> for QuizQuestionDto {
    fn from(question: QuizQuestion) -> Self {
        let answer_index = question.answer_index();
        QuizQuestionDto {
            question: question.question().to_string(),
            choices: question.choices().to_vec(),
            answer_index,
            answer_letter: (b'A' + answer_index as u8) as char,
            explanation: question.explanation().to_string(),
        }
    }
}
