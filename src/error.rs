use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Non-success answer from the completion, image or Slack APIs.
    #[error("{service} returned {status}: {body}")]
    UpstreamError {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Stream error: {0}")]
    StreamError(String),

    /// A thread, channel or message identifier is absent, so there is nowhere to reply.
    #[error("Missing context: {0}")]
    MissingContext(String),

    #[error("Signature error: {0}")]
    SignatureError(String),
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        BotError::RequestError(e.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display_carries_body() {
        let err = BotError::UpstreamError {
            service: "stability",
            status: 401,
            body: "{\"message\":\"bad key\"}".to_string(),
        };
        assert_eq!(err.to_string(), "stability returned 401: {\"message\":\"bad key\"}");
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: BotError = parse.unwrap_err().into();
        assert!(matches!(err, BotError::SerializationError(_)));
    }
}
