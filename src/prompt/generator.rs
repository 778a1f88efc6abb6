use crate::{clients::ChatCompletion, error::Result, models::ChatMessage};
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_SYSTEM_CONTENT: &str = "Please act as a prompt generator for the Stable-Diffusion AI. \
From the provided sentence, enumerate the most characteristic elements and details about a specific scene \
or object in concise English phrases separated by commas. The Stable-Diffusion AI will generate images based \
on this. The more specific these keywords are, the more detailed the generated image will be. For example, \
if you want to generate an image of the Amazon jungle, consider keywords such as \
\"Amazon, Jungle, Dense Rainforest, Green, Winding river\".";

/// Turns free text into a comma-separated prompt for a diffusion model.
#[derive(Clone)]
pub struct PromptGenerator {
    completion: Arc<dyn ChatCompletion>,
    model: String,
}

impl PromptGenerator {
    pub fn new(completion: Arc<dyn ChatCompletion>) -> Self {
        Self {
            completion,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Empty when the completion API answered without content.
    pub async fn generate(&self, user_content: &str, system_content: Option<&str>) -> Result<String> {
        let messages = vec![
            ChatMessage::system(system_content.unwrap_or(DEFAULT_SYSTEM_CONTENT)),
            ChatMessage::user(user_content),
        ];

        let prompt = self
            .completion
            .complete(&self.model, messages)
            .await?
            .unwrap_or_default();

        log::info!("Generated prompt: {}", prompt);
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        answer: Option<String>,
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    #[async_trait]
    impl ChatCompletion for Recorder {
        async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<Option<String>> {
            self.calls.lock().unwrap().push((model.to_string(), messages));
            Ok(self.answer.clone())
        }
    }

    fn recorder(answer: Option<&str>) -> Arc<Recorder> {
        Arc::new(Recorder {
            answer: answer.map(String::from),
            calls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_sends_default_system_then_user() {
        let completion = recorder(Some("Amazon, Jungle"));
        let generator = PromptGenerator::new(completion.clone());

        let prompt = generator.generate("a jungle at dawn", None).await.unwrap();
        assert_eq!(prompt, "Amazon, Jungle");

        let calls = completion.calls.lock().unwrap();
        let (model, messages) = &calls[0];
        assert_eq!(model, "gpt-3.5-turbo");
        assert_eq!(messages[0], ChatMessage::system(DEFAULT_SYSTEM_CONTENT));
        assert_eq!(messages[1], ChatMessage::user("a jungle at dawn"));
    }

    #[tokio::test]
    async fn test_system_override_and_model() {
        let completion = recorder(Some("x"));
        let generator = PromptGenerator::new(completion.clone()).with_model("gpt-4o-mini");

        generator.generate("cat", Some("be brief")).await.unwrap();

        let calls = completion.calls.lock().unwrap();
        assert_eq!(calls[0].0, "gpt-4o-mini");
        assert_eq!(calls[0].1[0].content, "be brief");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty() {
        let generator = PromptGenerator::new(recorder(None));
        assert_eq!(generator.generate("cat", None).await.unwrap(), "");
    }
}
