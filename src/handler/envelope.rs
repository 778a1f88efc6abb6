use crate::models::{
    AppMentionEvent, BlockActionPayload, ButtonAction, EventEnvelope, InboundEvent,
    GENERATE_ACTION,
};
use futures::future::BoxFuture;
use std::collections::HashMap;

pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Raw HTTP delivery as handed over by the hosting platform.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    headers: HashMap<String, String>,
    pub body: String,
}

impl InboundRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Header names are matched case-insensitively.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn is_form_encoded(&self) -> bool {
        self.header("content-type")
            .map(|value| value.contains("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn challenge(challenge: &str) -> Self {
        Self::new(200, serde_json::json!({ "challenge": challenge }).to_string())
    }

    pub fn redelivery() -> Self {
        Self::new(
            200,
            serde_json::json!({ "message": "No need to resend" }).to_string(),
        )
    }

    pub fn accepted() -> Self {
        Self::new(202, "")
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "")
    }
}

/// Immediate response plus the slow work to run once it has been sent.
pub struct Dispatch {
    pub response: HandlerResponse,
    pub work: Option<BoxFuture<'static, ()>>,
}

impl Dispatch {
    pub fn respond(response: HandlerResponse) -> Self {
        Self {
            response,
            work: None,
        }
    }

    pub fn accept(work: BoxFuture<'static, ()>) -> Self {
        Self {
            response: HandlerResponse::accepted(),
            work: Some(work),
        }
    }
}

/// `Some(challenge)` when the body is a URL-verification handshake.
/// Bodies that are not JSON are simply not handshakes.
pub fn url_verification_challenge(body: &str) -> Option<String> {
    let envelope: EventEnvelope = serde_json::from_str(body).ok()?;
    if envelope.kind == "url_verification" {
        Some(envelope.challenge.unwrap_or_default())
    } else {
        None
    }
}

/// Decodes the deliveries the bot reacts to; everything else is `None`.
pub fn parse_inbound_event(request: &InboundRequest) -> Option<InboundEvent> {
    if request.is_form_encoded() {
        parse_interaction(&request.body)
    } else {
        parse_event_callback(&request.body)
    }
}

fn parse_event_callback(body: &str) -> Option<InboundEvent> {
    let envelope: EventEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::warn!("Ignoring body that is not an event envelope: {}", e);
            return None;
        }
    };
    if envelope.kind != "event_callback" {
        log::debug!("Ignoring envelope of type {}", envelope.kind);
        return None;
    }

    let event = envelope.event?;
    if event.get("type").and_then(|kind| kind.as_str()) != Some("app_mention") {
        log::debug!("Ignoring event {:?}", event.get("type"));
        return None;
    }

    match serde_json::from_value::<AppMentionEvent>(event) {
        Ok(mention) => Some(InboundEvent::Mention(mention)),
        Err(e) => {
            log::warn!("Malformed app_mention event: {}", e);
            None
        }
    }
}

fn parse_interaction(body: &str) -> Option<InboundEvent> {
    let raw = form_field(body, "payload")?;
    let payload: BlockActionPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Malformed interaction payload: {}", e);
            return None;
        }
    };

    let clicked_generate = payload
        .actions
        .iter()
        .any(|action| action.action_id == GENERATE_ACTION);
    if payload.kind != "block_actions" || !clicked_generate {
        log::debug!("Ignoring interaction of type {}", payload.kind);
        return None;
    }

    Some(InboundEvent::ButtonAction(ButtonAction::from(payload)))
}

/// Reads one field of an `application/x-www-form-urlencoded` body.
fn form_field(body: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
