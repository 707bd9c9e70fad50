pub mod seen_question_repository;

pub use seen_question_repository::{
    MongoSeenQuestionRepository, SeenQuestionRepository, DEFAULT_SEEN_COLLECTION,
};

#[cfg(test)]
pub use seen_question_repository::MockSeenQuestionRepository;
