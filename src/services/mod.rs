pub mod completion_service;
pub mod quiz_generation_service;
pub mod quiz_pipeline;

pub use completion_service::{CompletionService, OpenAiCompletionService};
pub use quiz_generation_service::QuizGenerationService;
