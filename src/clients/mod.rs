pub mod image_client;
pub mod slack_client;
pub mod stream_client;
pub mod text_client;
pub mod traits;

use crate::{config::Config, error::Result};
use std::sync::Arc;

pub use image_client::ImageClient;
pub use slack_client::SlackClient;
pub use stream_client::{GenerationTransport, StreamingImageClient};
pub use text_client::TextClient;
pub use traits::{ChatCompletion, ImageGenerator, SlackApi};

/// Long-lived API clients, built once per process and shared by every request.
#[derive(Clone)]
pub struct ServiceClients {
    slack: Arc<dyn SlackApi>,
    text: Arc<dyn ChatCompletion>,
    image: Arc<dyn ImageGenerator>,
}

impl ServiceClients {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("slack-diffusion/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            slack: Arc::new(SlackClient::new(http.clone(), &config.slack)?),
            text: Arc::new(TextClient::new(http.clone(), &config.openai)?),
            image: Arc::new(ImageClient::new(http, &config.stability)?),
        })
    }

    /// Assembles clients from existing implementations, e.g. a streaming image backend.
    pub fn from_parts(
        slack: Arc<dyn SlackApi>,
        text: Arc<dyn ChatCompletion>,
        image: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self { slack, text, image }
    }

    pub fn slack(&self) -> &Arc<dyn SlackApi> {
        &self.slack
    }

    pub fn text(&self) -> &Arc<dyn ChatCompletion> {
        &self.text
    }

    pub fn image(&self) -> &Arc<dyn ImageGenerator> {
        &self.image
    }
}
