use crate::{
    clients::traits::SlackApi,
    config::SlackConfig,
    error::{BotError, Result},
    models::{
        HistoryMessage, HistoryResponse, PostMessage, SlackApiResponse, UploadRequest,
        UploadResult,
    },
};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};

#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(client: Client, config: &SlackConfig) -> Result<Self> {
        let bot_token = config
            .bot_token
            .clone()
            .ok_or_else(|| BotError::ConfigError("Slack bot token is required".into()))?;

        Ok(Self {
            client,
            bot_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    fn upload_form(upload: UploadRequest) -> Result<Form> {
        let file = Part::bytes(upload.data)
            .file_name(upload.filename)
            .mime_str("image/png")
            .map_err(|e| BotError::RequestError(e.to_string()))?;

        let mut form = Form::new().part("file", file);
        if let Some(title) = upload.title {
            form = form.text("title", title);
        }
        if let Some(channel) = upload.channel {
            form = form.text("channels", channel);
        }
        if let Some(thread_ts) = upload.thread_ts {
            form = form.text("thread_ts", thread_ts);
        }
        Ok(form)
    }

    async fn send_upload(&self, upload: UploadRequest) -> Result<UploadResult> {
        let form = Self::upload_form(upload)?;

        let response = self
            .client
            .post(self.method_url("files.upload"))
            .bearer_auth(&self.bot_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(UploadResult::failed(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<UploadResult>()
            .await
            .map_err(|e| BotError::ResponseError(e.to_string()))
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn post_message(&self, message: PostMessage) -> Result<()> {
        log::debug!(
            "Posting message to {} (thread {:?})",
            message.channel,
            message.thread_ts
        );

        let response: SlackApiResponse = self
            .client
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&message)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| BotError::ResponseError(e.to_string()))?;

        if !response.ok {
            return Err(BotError::UpstreamError {
                service: "slack chat.postMessage",
                status: 200,
                body: response.error.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn conversations_history(
        &self,
        channel: &str,
        latest: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>> {
        let limit = limit.to_string();
        let response: HistoryResponse = self
            .client
            .get(self.method_url("conversations.history"))
            .bearer_auth(&self.bot_token)
            .query(&[
                ("channel", channel),
                ("latest", latest),
                ("inclusive", "true"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| BotError::ResponseError(e.to_string()))?;

        if !response.ok {
            return Err(BotError::UpstreamError {
                service: "slack conversations.history",
                status: 200,
                body: response.error.unwrap_or_default(),
            });
        }
        Ok(response.messages)
    }

    async fn upload_file(&self, upload: UploadRequest) -> UploadResult {
        let filename = upload.filename.clone();
        match self.send_upload(upload).await {
            Ok(result) => {
                if !result.ok {
                    log::warn!("Upload of {} rejected: {:?}", filename, result.error);
                }
                result
            }
            Err(e) => {
                log::error!("Upload of {} failed: {}", filename, e);
                UploadResult::failed(e.to_string())
            }
        }
    }
}
