use super::{blocks, EventHandler};
use crate::{
    clients::SlackApi,
    error::{BotError, Result},
    models::{
        ButtonAction, GeneratedImage, ImageSize, InteractionState, PostMessage,
        TextToImageRequest, UploadRequest, UploadResult, IMAGE_SIZE_ACTION, PROMPT_INPUT_ACTION,
    },
    prompt::format_prompt,
};
use futures::future::join_all;

/// How many recent channel messages are fetched to find the upload thread.
const HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInputs {
    pub prompt: String,
    pub size: ImageSize,
}

/// Reads the edited prompt and chosen size from the form state.
///
/// `None` when the prompt is missing or blank. A missing or unparseable size
/// falls back to the default.
pub fn resolve_generation_inputs(state: &InteractionState) -> Option<GenerationInputs> {
    let prompt = state
        .text_value(PROMPT_INPUT_ACTION)
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())?
        .to_string();

    let size = state
        .selected_value(IMAGE_SIZE_ACTION)
        .map(ImageSize::parse_or_default)
        .unwrap_or_default();

    Some(GenerationInputs { prompt, size })
}

/// Message ts and channel id of the click, the only place a reply can go.
pub fn reply_context(action: &ButtonAction) -> Result<(&str, &str)> {
    match (action.message_ts.as_deref(), action.channel_id.as_deref()) {
        (Some(message_ts), Some(channel)) => Ok((message_ts, channel)),
        _ => Err(BotError::MissingContext(
            "message ts or channel id is missing from the interaction".into(),
        )),
    }
}

/// Uploads every image concurrently; one result per image.
pub async fn upload_images(
    slack: &dyn SlackApi,
    images: Vec<GeneratedImage>,
    channel: &str,
    thread_ts: Option<&str>,
) -> Vec<UploadResult> {
    let uploads = images.into_iter().map(|image| {
        slack.upload_file(UploadRequest {
            filename: image.filename(),
            data: image.data,
            title: None,
            channel: Some(channel.to_string()),
            thread_ts: thread_ts.map(String::from),
        })
    });
    join_all(uploads).await
}

impl EventHandler {
    /// Generates and uploads images for a click on the generate button.
    ///
    /// The click has already been acknowledged by the 202 response.
    pub async fn handle_button_action(&self, action: ButtonAction) {
        let (message_ts, channel) = match reply_context(&action) {
            Ok(context) => context,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        if let Err(e) = self.run_generation(&action, channel, message_ts).await {
            log::error!("Image generation in {} failed: {}", channel, e);
            self.report_error(channel, message_ts, &e).await;
        }
    }

    async fn run_generation(&self, action: &ButtonAction, channel: &str, message_ts: &str) -> Result<()> {
        let Some(inputs) = resolve_generation_inputs(&action.state) else {
            log::error!("Prompt is missing from the interaction state");
            return Ok(());
        };

        log::info!("prompt: {}", inputs.prompt);
        log::info!("image size: {}", inputs.size);

        let thread_ts = self
            .resolve_upload_thread(channel, message_ts, action.message_thread_ts.as_deref())
            .await?;

        let request = TextToImageRequest::new(format_prompt(&inputs.prompt), inputs.size);
        let images = self.images.text_to_image(request).await?;
        log::info!("Generated {} images", images.len());

        let results = upload_images(self.slack.as_ref(), images, channel, Some(&thread_ts)).await;

        let failures = results.iter().filter(|result| !result.ok).count();
        if failures > 0 {
            log::warn!("{} of {} uploads failed", failures, results.len());
            self.slack
                .post_message(PostMessage::text(
                    channel,
                    message_ts,
                    blocks::UPLOAD_FAILED_MESSAGE,
                ))
                .await?;
        }
        Ok(())
    }

    /// Thread of the most recent channel message, falling back to the clicked message.
    async fn resolve_upload_thread(
        &self,
        channel: &str,
        message_ts: &str,
        message_thread_ts: Option<&str>,
    ) -> Result<String> {
        let history = self
            .slack
            .conversations_history(channel, message_ts, HISTORY_LIMIT)
            .await?;

        let from_history = history
            .into_iter()
            .next()
            .and_then(|latest| latest.thread_ts.or(latest.ts));

        Ok(from_history.unwrap_or_else(|| message_thread_ts.unwrap_or(message_ts).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(values: serde_json::Value) -> InteractionState {
        serde_json::from_value(json!({ "values": values })).unwrap()
    }

    #[test]
    fn test_resolves_prompt_and_size() {
        let inputs = resolve_generation_inputs(&state(json!({
            "a": { "prompt_input": { "value": " sky:0.8, sea " } },
            "b": { "select_image_size": { "selected_option": { "value": "1024x1024" } } }
        })))
        .unwrap();
        assert_eq!(inputs.prompt, "sky:0.8, sea");
        assert_eq!(inputs.size, ImageSize::LARGE);
    }

    #[test]
    fn test_unparseable_size_keeps_default() {
        let inputs = resolve_generation_inputs(&state(json!({
            "a": { "prompt_input": { "value": "sky" } },
            "b": { "select_image_size": { "selected_option": { "value": "512×512" } } }
        })))
        .unwrap();
        assert_eq!(inputs.size, ImageSize::SMALL);
    }

    #[test]
    fn test_missing_size_keeps_default() {
        let inputs =
            resolve_generation_inputs(&state(json!({ "a": { "prompt_input": { "value": "sky" } } })))
                .unwrap();
        assert_eq!(inputs.size, ImageSize::default());
    }

    fn click(message_ts: Option<&str>, channel_id: Option<&str>) -> ButtonAction {
        ButtonAction {
            state: InteractionState::default(),
            message_ts: message_ts.map(String::from),
            message_thread_ts: None,
            channel_id: channel_id.map(String::from),
        }
    }

    #[test]
    fn test_reply_context_needs_ts_and_channel() {
        let action = click(Some("3.0"), Some("C1"));
        assert_eq!(reply_context(&action).unwrap(), ("3.0", "C1"));

        for action in [click(None, Some("C1")), click(Some("3.0"), None)] {
            assert!(matches!(
                reply_context(&action),
                Err(BotError::MissingContext(_))
            ));
        }
    }

    #[test]
    fn test_blank_prompt_aborts() {
        assert!(resolve_generation_inputs(&state(json!({
            "a": { "prompt_input": { "value": "   " } }
        })))
        .is_none());
        assert!(resolve_generation_inputs(&InteractionState::default()).is_none());
    }
}
