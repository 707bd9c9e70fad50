pub mod quiz_dto;
pub mod request;
pub mod response;

pub use quiz_dto::QuizQuestionDto;
pub use request::GenerateQuizRequestDto;
pub use response::GenerateQuizResponseDto;
