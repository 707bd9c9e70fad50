use serde::{Deserialize, Serialize};

use crate::models::domain::QuizQuestion;
use crate::models::dto::quiz_dto::QuizQuestionDto;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateQuizResponseDto {
    pub topic: String,
    pub count: usize,
    pub questions: Vec<QuizQuestionDto>,
}

impl GenerateQuizResponseDto {
    pub fn new(topic: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        let questions: Vec<QuizQuestionDto> =
            questions.into_iter().map(QuizQuestionDto::from).collect();
        Self {
            topic: topic.into(),
            count: questions.len(),
            questions,
        }
    }
}
