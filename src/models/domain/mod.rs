pub mod quiz_question;
pub mod raw_candidate;
pub mod seen_question;
pub use quiz_question::{QuizQuestion, QuizQuestionError};
pub use raw_candidate::RawCandidate;
pub use seen_question::SeenQuestion;
