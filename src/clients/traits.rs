use crate::{
    error::Result,
    models::{
        ChatMessage, GeneratedImage, HistoryMessage, PostMessage, TextToImageRequest,
        UploadRequest, UploadResult,
    },
};
use async_trait::async_trait;

/// Text-completion backend used to synthesize image prompts.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns the first choice's content, `None` when the API produced nothing.
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<Option<String>>;
}

/// Text-to-image backend. Images come back in API order.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn text_to_image(&self, request: TextToImageRequest) -> Result<Vec<GeneratedImage>>;
}

/// The slice of the Slack Web API the bot talks to.
#[async_trait]
pub trait SlackApi: Send + Sync {
    async fn post_message(&self, message: PostMessage) -> Result<()>;

    async fn conversations_history(
        &self,
        channel: &str,
        latest: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>>;

    /// Never fails: transport errors come back as a result with `ok == false`.
    async fn upload_file(&self, upload: UploadRequest) -> UploadResult;
}
