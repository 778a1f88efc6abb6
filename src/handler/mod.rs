//! Slack delivery handling.
//!
//! [`EventHandler::dispatch`] shapes the HTTP answer for one delivery and
//! hands back the slow work separately, so the host can send the response
//! before the completion, image and upload calls run.

pub mod action;
pub mod blocks;
pub mod envelope;
pub mod mention;
pub mod signature;

use crate::{
    clients::{ImageGenerator, ServiceClients, SlackApi},
    error::BotError,
    models::{InboundEvent, PostMessage},
    prompt::PromptGenerator,
};
use futures::FutureExt;
use std::sync::Arc;

pub use action::{reply_context, resolve_generation_inputs, upload_images, GenerationInputs};
pub use envelope::{Dispatch, HandlerResponse, InboundRequest};
pub use mention::strip_mention;
pub use signature::SignatureVerifier;

#[derive(Clone)]
pub struct EventHandler {
    slack: Arc<dyn SlackApi>,
    prompts: PromptGenerator,
    images: Arc<dyn ImageGenerator>,
    verifier: Option<SignatureVerifier>,
}

impl EventHandler {
    /// Handler without signature checks. Hosts add one with
    /// [`EventHandler::with_signing_secret`]; `server::build_handler` always does.
    pub fn new(clients: &ServiceClients) -> Self {
        Self {
            slack: clients.slack().clone(),
            prompts: PromptGenerator::new(clients.text().clone()),
            images: clients.image().clone(),
            verifier: None,
        }
    }

    /// Requires every dispatched delivery to carry a valid Slack signature.
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.verifier = Some(SignatureVerifier::new(secret));
        self
    }

    pub fn with_prompt_generator(mut self, prompts: PromptGenerator) -> Self {
        self.prompts = prompts;
        self
    }

    /// Decides the HTTP answer for one delivery.
    ///
    /// Order matters: the URL-verification handshake is answered first, then
    /// redeliveries are dropped, then the signature is checked. Recognized
    /// events are acknowledged with 202 and their flow is returned as
    /// deferred work.
    pub fn dispatch(&self, request: &InboundRequest) -> Dispatch {
        if let Some(challenge) = envelope::url_verification_challenge(&request.body) {
            log::info!("Answering URL verification");
            return Dispatch::respond(HandlerResponse::challenge(&challenge));
        }

        if let Some(retry) = request.header(envelope::RETRY_NUM_HEADER) {
            log::info!("Dropping redelivery #{}", retry);
            return Dispatch::respond(HandlerResponse::redelivery());
        }

        if let Some(verifier) = &self.verifier {
            let checked = verifier.verify(
                request.header(envelope::TIMESTAMP_HEADER),
                request.header(envelope::SIGNATURE_HEADER),
                &request.body,
                chrono::Utc::now().timestamp(),
            );
            if let Err(e) = checked {
                log::warn!("Rejected delivery: {}", e);
                return Dispatch::respond(HandlerResponse::unauthorized());
            }
        }

        let Some(event) = envelope::parse_inbound_event(request) else {
            return Dispatch::respond(HandlerResponse::accepted());
        };

        let handler = self.clone();
        let work = async move {
            match event {
                InboundEvent::Mention(mention) => handler.handle_mention(mention).await,
                InboundEvent::ButtonAction(action) => handler.handle_button_action(action).await,
            }
        };
        Dispatch::accept(work.boxed())
    }

    /// Tells the thread something went wrong. Failures here are only logged.
    async fn report_error(&self, channel: &str, thread_ts: &str, error: &BotError) {
        let notice = PostMessage::text(channel, thread_ts, blocks::error_message(error));
        if let Err(e) = self.slack.post_message(notice).await {
            log::error!("Could not report error to {}: {}", channel, e);
        }
    }
}
