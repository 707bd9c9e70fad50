use std::sync::Arc;

use actix_web::{post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{GenerateQuizRequestDto, GenerateQuizResponseDto},
};

#[post("/api/quizzes/generate")]
async fn generate_quiz(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
    request: web::Json<GenerateQuizRequestDto>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    log::info!(
        "[{}] Quiz generation requested: topic={:?} count={}",
        get_request_id(&req).unwrap_or_default(),
        request.topic,
        request.count
    );

    let questions = state
        .quiz_generation_service
        .generate_quiz_questions(
            &request.topic,
            request.count,
            request.guild_id,
            request.user_id,
        )
        .await?;

    Ok(HttpResponse::Ok().json(GenerateQuizResponseDto::new(request.topic, questions)))
}
