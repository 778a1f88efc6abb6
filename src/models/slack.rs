use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PROMPT_INPUT_ACTION: &str = "prompt_input";
pub const IMAGE_SIZE_ACTION: &str = "select_image_size";
pub const GENERATE_ACTION: &str = "gen_image";

/// Outer envelope of the Events API.
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub challenge: Option<String>,
    pub event: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppMentionEvent {
    #[serde(default)]
    pub text: String,
    pub channel: String,
    pub ts: String,
    pub thread_ts: Option<String>,
}

impl AppMentionEvent {
    /// Replies go to the enclosing thread, or start one under the mention.
    pub fn thread_anchor(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Interactive payload posted as `payload=<json>` when a block element is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockActionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
    pub message: Option<InteractionMessage>,
    pub channel: Option<InteractionChannel>,
    pub state: Option<InteractionState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMessage {
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    pub id: Option<String>,
}

/// `state.values`: block id → action id → element value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateValue {
    pub value: Option<String>,
    pub selected_option: Option<SelectedOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

impl InteractionState {
    /// Finds the element with `action_id` regardless of which block holds it.
    pub fn field(&self, action_id: &str) -> Option<&StateValue> {
        self.values
            .values()
            .find_map(|actions| actions.get(action_id))
    }

    pub fn text_value(&self, action_id: &str) -> Option<&str> {
        self.field(action_id).and_then(|field| field.value.as_deref())
    }

    /// Select elements report `selected_option`; plain values are accepted as well.
    pub fn selected_value(&self, action_id: &str) -> Option<&str> {
        self.field(action_id).and_then(|field| {
            field
                .selected_option
                .as_ref()
                .map(|option| option.value.as_str())
                .or(field.value.as_deref())
        })
    }
}

#[derive(Debug, Clone)]
pub enum InboundEvent {
    Mention(AppMentionEvent),
    ButtonAction(ButtonAction),
}

#[derive(Debug, Clone)]
pub struct ButtonAction {
    pub state: InteractionState,
    pub message_ts: Option<String>,
    pub message_thread_ts: Option<String>,
    pub channel_id: Option<String>,
}

impl From<BlockActionPayload> for ButtonAction {
    fn from(payload: BlockActionPayload) -> Self {
        let (message_ts, message_thread_ts) = match payload.message {
            Some(message) => (message.ts, message.thread_ts),
            None => (None, None),
        };
        Self {
            state: payload.state.unwrap_or_default(),
            message_ts,
            message_thread_ts,
            channel_id: payload.channel.and_then(|channel| channel.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<serde_json::Value>,
}

impl PostMessage {
    pub fn text(channel: impl Into<String>, thread_ts: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: Some(thread_ts.into()),
            text: Some(text.into()),
            blocks: None,
        }
    }

    pub fn blocks(
        channel: impl Into<String>,
        thread_ts: impl Into<String>,
        blocks: serde_json::Value,
    ) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: Some(thread_ts.into()),
            text: None,
            blocks: Some(blocks),
        }
    }
}

/// Envelope shared by every Web API answer.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackApiResponse {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub filename: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub thread_ts: Option<String>,
}

/// Outcome of one `files.upload` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    pub ok: bool,
    pub error: Option<String>,
}

impl UploadResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}
