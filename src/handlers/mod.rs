pub mod health_handler;
pub mod quiz_handler;

pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_handler::generate_quiz;
