//! LLM client integration using siumai
//!
//! One client per configured provider, with the request timeout applied
//! around every chat call.

use async_trait::async_trait;
use reposcope_core::{with_timeout, ErrorContext, LlmConfig, ScopeError, ScopeResult};
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Anything that can answer a system + user prompt pair with text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `provider/model`, used in logs
    fn describe(&self) -> String;

    async fn generate_with_system(&self, system_prompt: &str, user_message: &str)
        -> ScopeResult<String>;
}

/// Chat client for the provider named in [`LlmConfig`]
pub struct ScopeLlmClient {
    client: Box<dyn LlmClient>,
    config: LlmConfig,
}

impl ScopeLlmClient {
    /// Create a new LLM client
    pub async fn new(config: LlmConfig) -> ScopeResult<Self> {
        let client = Self::build_client(&config).await?;

        info!(
            provider = %config.provider,
            model = %config.model,
            "Created LLM client"
        );

        Ok(Self { client, config })
    }

    fn missing_key(provider: &str, env_var: &str) -> ScopeError {
        ScopeError::Config {
            message: format!("{} API key not found", provider),
            source: None,
            context: ErrorContext::new("llm_client")
                .with_operation("build_client")
                .with_suggestion(&format!("Set {} or llm.api_key", env_var))
                .with_suggestion("Run with --no-llm to use the template summary"),
        }
    }

    fn summary_error(config: &LlmConfig, operation: &str, message: String) -> ScopeError {
        ScopeError::Summary {
            message,
            provider: Some(config.provider.clone()),
            model: Some(config.model.clone()),
            context: ErrorContext::new("llm_client").with_operation(operation),
        }
    }

    fn api_key(config: &LlmConfig, provider: &str, env_var: &str) -> ScopeResult<String> {
        config
            .api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Self::missing_key(provider, env_var))
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(config: &LlmConfig) -> ScopeResult<Box<dyn LlmClient>> {
        let build_failed = |provider: &str, e: &dyn std::fmt::Display| {
            Self::summary_error(
                config,
                "build_client",
                format!("Failed to build {} client: {}", provider, e),
            )
        };

        match config.provider.as_str() {
            "openai" => {
                let api_key = Self::api_key(config, "OpenAI", "OPENAI_API_KEY")?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens);

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_failed("OpenAI", &e))?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = Self::api_key(config, "Anthropic", "ANTHROPIC_API_KEY")?;

                let client = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens)
                    .build()
                    .await
                    .map_err(|e| build_failed("Anthropic", &e))?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let client = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens)
                    .build()
                    .await
                    .map_err(|e| build_failed("Ollama", &e))?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = Self::api_key(config, "Groq", "GROQ_API_KEY")?;

                let client = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens)
                    .build()
                    .await
                    .map_err(|e| build_failed("Groq", &e))?;

                Ok(Box::new(client))
            }
            provider => Err(ScopeError::Config {
                message: format!("Unsupported LLM provider: {}", provider),
                source: None,
                context: ErrorContext::new("llm_client")
                    .with_operation("build_client")
                    .with_suggestion("Use one of: openai, anthropic, ollama, groq"),
            }),
        }
    }

    /// Generate a response using the LLM
    pub async fn generate(&self, messages: Vec<ChatMessage>) -> ScopeResult<String> {
        let start_time = Instant::now();

        debug!(messages = messages.len(), "Generating response");

        let response = with_timeout(
            self.client.chat(messages),
            self.config.timeout_seconds * 1000,
            "llm_chat",
        )
        .await?
        .map_err(|e| {
            Self::summary_error(
                &self.config,
                "chat",
                format!("LLM generation failed: {}", e),
            )
        })?;

        match response.content_text() {
            Some(content) => {
                info!(
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    chars = content.len(),
                    "Generated response"
                );
                Ok(content.trim().to_string())
            }
            None => Err(Self::summary_error(
                &self.config,
                "chat",
                "No text content in LLM response".to_string(),
            )),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for ScopeLlmClient {
    fn describe(&self) -> String {
        format!("{}/{}", self.config.provider, self.config.model)
    }

    async fn generate_with_system(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> ScopeResult<String> {
        let messages = vec![system!(system_prompt), user!(user_message)];

        self.generate(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_is_config_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };

        let err = tokio_test::block_on(ScopeLlmClient::new(config)).err().unwrap();
        assert!(matches!(err, ScopeError::Config { .. }));
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_configured_key_wins_over_environment() {
        let config = LlmConfig {
            api_key: Some("sk-configured".to_string()),
            ..LlmConfig::default()
        };

        let key = ScopeLlmClient::api_key(&config, "OpenAI", "REPOSCOPE_TEST_UNSET_KEY").unwrap();
        assert_eq!(key, "sk-configured");
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };

        let err = ScopeLlmClient::api_key(&config, "OpenAI", "REPOSCOPE_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, ScopeError::Config { .. }));
        let context = err.context().unwrap();
        assert!(context.recovery_suggestions[0].contains("REPOSCOPE_TEST_UNSET_KEY"));
    }
}
