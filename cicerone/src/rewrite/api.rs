use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};

use crate::error::{CiceroneError, Result};

const SERVICE: &str = "rewrite";

/// Thin OpenAI-compatible chat-completion client: one user-role prompt in,
/// one completion's content out.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key.unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                CiceroneError::Internal(format!("Failed to create rewrite HTTP client: {error}"))
            })?;

        // Single attempt per call: the strategy list owns retries and the
        // caller owns the deadline. async-openai's default backoff would
        // retry server errors for up to 15 minutes.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            model: model.to_string(),
            max_tokens,
        })
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(CiceroneError::Internal(
                "rewrite prompt cannot be empty".to_string(),
            ));
        }

        let request = self.build_request(prompt)?;
        match self.client.chat().create(request).await {
            Ok(response) => Self::extract_content(response),
            Err(error) => Err(CiceroneError::upstream(
                SERVICE,
                None,
                None,
                error.to_string(),
            )),
        }
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|error| {
                CiceroneError::Internal(format!("Invalid rewrite prompt: {error}"))
            })?
            .into()];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|error| {
                CiceroneError::Internal(format!("Invalid rewrite request: {error}"))
            })
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                CiceroneError::upstream(SERVICE, None, None, "completion contained no choices")
            })?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(CiceroneError::upstream(
                SERVICE,
                None,
                None,
                "completion contained empty content",
            ));
        }

        Ok(message)
    }
}
