//! Slack bot that turns a mention into a Stable Diffusion prompt, lets the user
//! edit it and pick a size, then uploads the generated images to the thread.

pub mod clients;
pub mod config;
pub mod error;
pub mod handler;
pub mod logger;
pub mod models;
pub mod prompt;
#[cfg(feature = "server")]
pub mod server;

pub use clients::{
    ChatCompletion, ImageClient, ImageGenerator, ServiceClients, SlackApi, SlackClient,
    StreamingImageClient, TextClient,
};
pub use config::{Config, OpenAiConfig, SlackConfig, StabilityConfig};
pub use error::{BotError, Result};
pub use handler::{Dispatch, EventHandler, HandlerResponse, InboundRequest};
pub use models::*;
pub use prompt::{format_prompt, PromptGenerator};
