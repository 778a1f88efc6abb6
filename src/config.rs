use std::env;

use crate::error::{BotError, Result};

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_STABILITY_API_HOST: &str = "https://api.stability.ai";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub signing_secret: Option<String>,
    pub bot_token: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    pub api_host: String,
    pub engine_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub slack: SlackConfig,
    pub openai: OpenAiConfig,
    pub stability: StabilityConfig,
}

impl Default for SlackConfig {
    fn default() -> Self {
        SlackConfig {
            signing_secret: None,
            bot_token: None,
            api_base: DEFAULT_SLACK_API_BASE.to_string(),
        }
    }
}

impl SlackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        SlackConfig {
            signing_secret: non_empty_var("SLACK_SIGNING_SECRET"),
            bot_token: non_empty_var("SLACK_BOT_TOKEN"),
            api_base: non_empty_var("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string()),
        }
    }

    pub fn with_credentials(
        mut self,
        signing_secret: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        self.signing_secret = Some(signing_secret.into());
        self.bot_token = Some(bot_token.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            model: None,
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        OpenAiConfig {
            api_key: non_empty_var("OPENAI_API_KEY"),
            api_base: non_empty_var("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            model: non_empty_var("OPENAI_MODEL"),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: None,
            api_host: DEFAULT_STABILITY_API_HOST.to_string(),
            engine_id: None,
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        StabilityConfig {
            api_key: non_empty_var("STABILITY_API_KEY"),
            api_host: non_empty_var("API_HOST")
                .unwrap_or_else(|| DEFAULT_STABILITY_API_HOST.to_string()),
            engine_id: non_empty_var("STABILITY_ENGINE_ID"),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    pub fn with_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = Some(engine_id.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            slack: SlackConfig::default(),
            openai: OpenAiConfig::default(),
            stability: StabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            slack: SlackConfig::from_env(),
            openai: OpenAiConfig::from_env(),
            stability: StabilityConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_slack(mut self, config: SlackConfig) -> Self {
        self.slack = config;
        self
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = config;
        self
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Credentials the bot cannot run without, inbound and outbound.
    pub fn validate(&self) -> Result<()> {
        if self.slack.signing_secret.is_none() {
            return Err(BotError::ConfigError("SLACK_SIGNING_SECRET is required".into()));
        }
        if self.slack.bot_token.is_none() {
            return Err(BotError::ConfigError("SLACK_BOT_TOKEN is required".into()));
        }
        if self.openai.api_key.is_none() {
            return Err(BotError::ConfigError("OPENAI_API_KEY is required".into()));
        }
        if self.stability.api_key.is_none() {
            return Err(BotError::ConfigError(
                "Missing Stability API key (STABILITY_API_KEY)".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Config {
        Config::new()
            .with_slack(SlackConfig::new().with_credentials("secret", "xoxb-token"))
            .with_openai(OpenAiConfig::new().with_credentials("sk-test"))
            .with_stability(StabilityConfig::new().with_credentials("sk-stability"))
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.port_or_default(), 3000);
        assert_eq!(config.slack.api_base, "https://slack.com/api");
        assert_eq!(config.stability.api_host, "https://api.stability.ai");
        assert!(config.openai.model.is_none());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_stability_key() {
        let mut config = complete();
        config.stability.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("STABILITY_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_missing_signing_secret() {
        let mut config = complete();
        config.slack.signing_secret = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SLACK_SIGNING_SECRET"));
    }
}
