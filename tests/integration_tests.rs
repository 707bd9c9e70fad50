use std::sync::Arc;

use actix_web::{
    test::{call_service, init_service, read_body_json, TestRequest},
    web, App,
};
use async_trait::async_trait;

use mentra_server::{
    app_state::AppState,
    config::{Config, GenerationSettings},
    errors::AppResult,
    handlers,
    middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
    models::dto::GenerateQuizResponseDto,
    services::{
        quiz_pipeline::{parse_quiz_blocks, CandidateValidator, FingerprintSet, RuleSet},
        CompletionService, QuizGenerationService,
    },
};

const TWO_GOOD_ONE_BROKEN: &str = "Q: What port does HTTPS use?
A) 21
B) 443
C) 80
D) 3389
ANSWER: B
EXPLAIN: HTTPS defaults to TCP port 443. Port 80 is plain HTTP.
---
Q: Which tool maps open network ports?
A) Nmap
B) Hashcat
C) Ghidra
ANSWER: A
---
Q: Which hash function is considered broken?
A) MD5 (correct)
B) SHA-256
C) SHA-3
D) BLAKE2
ANSWER: A
EXPLAIN: Practical MD5 collisions exist.
---";

/// Always answers with the same text.
struct FixedCompletion(&'static str);

#[async_trait]
impl CompletionService for FixedCompletion {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> AppResult<String> {
        Ok(self.0.to_string())
    }
}

fn state_with(text: &'static str) -> web::Data<Arc<AppState>> {
    let config = Config::from_env();
    let service = Arc::new(QuizGenerationService::new(
        Arc::new(FixedCompletion(text)),
        None,
        GenerationSettings::default(),
    ));
    web::Data::new(Arc::new(AppState::from_parts(service, None, config)))
}

#[test]
fn pipeline_keeps_only_complete_valid_blocks() {
    let settings = GenerationSettings::default();
    let validator = CandidateValidator::new(settings.clone(), RuleSet::default());
    let mut fingerprints = FingerprintSet::new(settings.question_similarity_threshold);

    let parsed = parse_quiz_blocks(TWO_GOOD_ONE_BROKEN, settings.expected_choices);
    assert_eq!(parsed.len(), 2);

    let accepted: Vec<_> = parsed
        .iter()
        .filter_map(|raw| validator.validate(raw).ok())
        .filter(|q| fingerprints.try_accept(q).is_ok())
        .collect();

    assert_eq!(accepted.len(), 2);
    assert_eq!(accepted[0].explanation(), "HTTPS defaults to TCP port 443.");
    assert_eq!(accepted[1].choices()[0], "MD5");
}

#[actix_web::test]
async fn generate_endpoint_returns_questions_with_request_id() {
    let app = init_service(
        App::new()
            .app_data(state_with(TWO_GOOD_ONE_BROKEN))
            .wrap(RequestIdMiddleware)
            .service(handlers::generate_quiz),
    )
    .await;

    let req = TestRequest::post()
        .uri("/api/quizzes/generate")
        .set_json(serde_json::json!({ "topic": "web security", "count": 2 }))
        .to_request();
    let resp = call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

    let body: GenerateQuizResponseDto = read_body_json(resp).await;
    assert_eq!(body.count, 2);
    assert_eq!(body.questions[0].question, "What port does HTTPS use?");
    assert_eq!(body.questions[0].answer_index, 1);
    assert_eq!(body.questions[1].answer_letter, 'A');
}

#[actix_web::test]
async fn generate_endpoint_reports_shortfall() {
    let app = init_service(
        App::new()
            .app_data(state_with(TWO_GOOD_ONE_BROKEN))
            .service(handlers::generate_quiz),
    )
    .await;

    let req = TestRequest::post()
        .uri("/api/quizzes/generate")
        .set_json(serde_json::json!({ "topic": "web security", "count": 5 }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let body: serde_json::Value = read_body_json(resp).await;
    assert_eq!(body["produced"], 2);
    assert_eq!(body["requested"], 5);
}

#[actix_web::test]
async fn generate_endpoint_validates_topic() {
    let app = init_service(
        App::new()
            .app_data(state_with(TWO_GOOD_ONE_BROKEN))
            .service(handlers::generate_quiz),
    )
    .await;

    let req = TestRequest::post()
        .uri("/api/quizzes/generate")
        .set_json(serde_json::json!({ "topic": "", "count": 2 }))
        .to_request();
    let resp = call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn health_endpoints_respond() {
    let app = init_service(
        App::new()
            .app_data(state_with(""))
            .service(handlers::health_check)
            .service(handlers::health_check_live)
            .service(handlers::health_check_ready),
    )
    .await;

    for uri in ["/health", "/health/live", "/health/ready"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.status().is_success(), "{} failed", uri);
    }
}
