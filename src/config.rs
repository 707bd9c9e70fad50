use std::env;
use secrecy::SecretString;

use crate::repositories::DEFAULT_SEEN_COLLECTION;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub seen_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub llm_api_base_url: String,
    pub llm_api_key: SecretString,
    pub llm_model_name: String,
    pub seen_prune_ttl_days: i64,
    pub generation: GenerationSettings,
}

/// Limits and thresholds of the quiz generation pipeline.
///
/// The thresholds are empirically tuned values, not derived ones.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub expected_choices: usize,
    pub max_question_len: usize,
    pub max_explanation_len: usize,
    pub max_choice_len: usize,
    pub max_choice_words: usize,
    pub option_overlap_threshold: f64,
    pub question_similarity_threshold: f64,
    pub length_giveaway_ratio: f64,
    pub temperature: f32,
    pub batch_rounds: usize,
    pub fill_tries: usize,
    pub batch_buffer: usize,
    pub batch_min: usize,
    pub batch_max: usize,
    pub avoid_list_cap: usize,
    pub avoid_prompt_entries: usize,
    pub avoid_history_limit: i64,
    pub avoid_ttl_days: i64,
    pub max_questions: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            expected_choices: 4,
            max_question_len: 200,
            max_explanation_len: 200,
            max_choice_len: 60,
            max_choice_words: 7,
            option_overlap_threshold: 0.72,
            question_similarity_threshold: 0.82,
            length_giveaway_ratio: 1.6,
            temperature: 0.75,
            batch_rounds: 10,
            fill_tries: 40,
            batch_buffer: 2,
            batch_min: 3,
            batch_max: 8,
            avoid_list_cap: 40,
            avoid_prompt_entries: 12,
            avoid_history_limit: 120,
            avoid_ttl_days: 30,
            max_questions: 10,
        }
    }
}

impl GenerationSettings {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            temperature: env::var("QUIZ_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.temperature),
            batch_rounds: env::var("QUIZ_BATCH_ROUNDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.batch_rounds),
            fill_tries: env::var("QUIZ_FILL_TRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.fill_tries),
            avoid_list_cap: env::var("QUIZ_AVOID_LIST_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.avoid_list_cap),
            ..default
        }
    }

    /// Token budget for a batch request of `request_n` questions.
    pub fn batch_max_tokens(&self, request_n: usize) -> u32 {
        (750 + request_n as u32 * 260).min(2000)
    }

    /// Batch size for a round: the remaining need plus a buffer, clamped.
    pub fn batch_request_size(&self, remaining: usize) -> usize {
        (remaining + self.batch_buffer).clamp(self.batch_min, self.batch_max)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "mentra-local".to_string()),
            seen_collection: env::var("SEEN_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_SEEN_COLLECTION.to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            llm_api_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
            llm_api_key: SecretString::from(env::var("BOT_API_KEY")
                .unwrap_or_default()),
            llm_model_name: env::var("DEFAULT_MODEL")
                .unwrap_or_else(|_| "qwen2.5:7b-instruct".to_string()),
            seen_prune_ttl_days: env::var("SEEN_PRUNE_TTL_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(60),
            generation: GenerationSettings::from_env(),
        }
    }

    /// Logs a warning for configuration that only makes sense locally.
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let is_local = self.llm_api_base_url.contains("localhost")
            || self.llm_api_base_url.contains("127.0.0.1");

        if !is_local && self.llm_api_key.expose_secret().is_empty() {
            log::warn!(
                "BOT_API_KEY is empty while OPENAI_BASE_URL points at a remote endpoint ({})",
                self.llm_api_base_url
            );
        }

        if self.generation.avoid_list_cap == 0 {
            log::warn!("QUIZ_AVOID_LIST_CAP is 0; prompts will carry no avoid-list");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "mentra-test".to_string(),
            seen_collection: DEFAULT_SEEN_COLLECTION.to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            llm_api_base_url: "http://localhost:11434/v1".to_string(),
            llm_api_key: SecretString::from("test_api_key".to_string()),
            llm_model_name: "test-model".to_string(),
            seen_prune_ttl_days: 60,
            generation: GenerationSettings::default(),
        }
    }
}
