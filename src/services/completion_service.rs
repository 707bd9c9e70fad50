use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::{config::Config, errors::AppResult};

const LANGUAGE_PREAMBLE: &str = "Answer in English only.";

/// A chat-style text completion backend.
///
/// An empty string is a valid answer; transport failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> AppResult<String>;
}

/// Completion backend for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompletionService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiCompletionService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.expose_secret())
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    #[allow(deprecated)]
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> AppResult<String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(format!("{LANGUAGE_PREAMBLE}\n\n{user_prompt}"))
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system),
                ChatCompletionRequestMessage::User(user),
            ])
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()?;

        log::debug!(
            "Requesting completion from {} (max_tokens={}, temperature={})",
            self.model_name,
            max_tokens,
            temperature
        );

        let response = self.client.chat().create(request).await.map_err(|e| {
            log::warn!("Completion request failed: {}", e);
            e
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}
