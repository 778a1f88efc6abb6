use crate::{
    clients::traits::ChatCompletion,
    config::OpenAiConfig,
    error::{BotError, Result},
    logger,
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};
use async_trait::async_trait;
use reqwest::Client;

/// OpenAI chat-completions client.
#[derive(Clone)]
pub struct TextClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl TextClient {
    pub fn new(client: Client, config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BotError::ConfigError("OpenAI API key is required".into()))?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_base)
    }
}

#[async_trait]
impl ChatCompletion for TextClient {
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<Option<String>> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
        };

        log::info!("Requesting chat completion with model: {}", model);
        log::debug!(
            "Chat completion payload: {}",
            serde_json::to_string(&request)?
        );
        let _timer = logger::timer("chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::RequestError(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("OpenAI returned {}: {}", status, body);
            return Err(BotError::UpstreamError {
                service: "openai",
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BotError::ResponseError(e.to_string()))?;

        Ok(completion.first_content())
    }
}
