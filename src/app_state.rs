use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoSeenQuestionRepository, SeenQuestionRepository},
    services::{
        completion_service::OpenAiCompletionService,
        quiz_generation_service::QuizGenerationService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_generation_service: Arc<QuizGenerationService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let seen_repository = Arc::new(MongoSeenQuestionRepository::new(
            &db,
            &config.seen_collection,
        ));
        seen_repository.ensure_indexes().await?;

        match seen_repository
            .prune_older_than(config.seen_prune_ttl_days)
            .await
        {
            Ok(removed) => log::info!(
                "Pruned {} seen question(s) older than {} days",
                removed,
                config.seen_prune_ttl_days
            ),
            Err(e) => log::warn!("Pruning seen questions failed: {}", e),
        }

        let completion = Arc::new(OpenAiCompletionService::new(&config));
        let quiz_generation_service = Arc::new(QuizGenerationService::new(
            completion,
            Some(seen_repository),
            config.generation.clone(),
        ));

        Ok(Self {
            quiz_generation_service,
            db: Some(db),
            config: Arc::new(config),
        })
    }

    /// Assembles state from already-built parts, without a database connection
    /// unless one is supplied.
    pub fn from_parts(
        quiz_generation_service: Arc<QuizGenerationService>,
        db: Option<Database>,
        config: Config,
    ) -> Self {
        Self {
            quiz_generation_service,
            db,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion_service::MockCompletionService;

    #[test]
    fn app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn from_parts_keeps_config() {
        let config = Config::test_config();
        let service = Arc::new(QuizGenerationService::new(
            Arc::new(MockCompletionService::new()),
            None,
            config.generation.clone(),
        ));

        let state = AppState::from_parts(service, None, config);
        assert!(state.db.is_none());
        assert_eq!(state.config.mongo_db_name, "mentra-test");
    }
}
