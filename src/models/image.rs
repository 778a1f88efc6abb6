use serde::{Deserialize, Serialize};

use super::prompt::{GenerationPrompt, ImageSize, PromptSegment};

#[derive(Debug, Clone)]
pub struct TextToImageRequest {
    pub prompts: GenerationPrompt,
    pub width: u32,
    pub height: u32,
    pub engine_id: Option<String>,
}

impl TextToImageRequest {
    pub fn new(prompts: GenerationPrompt, size: ImageSize) -> Self {
        Self {
            prompts,
            width: size.width,
            height: size.height,
            engine_id: None,
        }
    }

    pub fn with_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = Some(engine_id.into());
        self
    }
}

/// Decoded image bytes, in the order the API returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub index: usize,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    pub fn filename(&self) -> String {
        format!("image_{}.png", self.index)
    }
}

/// JSON body of `POST /v1/generation/{engine}/text-to-image`.
#[derive(Debug, Serialize)]
pub struct StabilityTextToImageBody<'a> {
    pub text_prompts: &'a [PromptSegment],
    pub cfg_scale: f32,
    pub clip_guidance_preset: &'a str,
    pub height: u32,
    pub width: u32,
    pub samples: u32,
    pub steps: u32,
}

#[derive(Debug, Deserialize)]
pub struct StabilityArtifact {
    pub base64: String,
    pub seed: Option<u64>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StabilityGenerationResponse {
    pub artifacts: Vec<StabilityArtifact>,
}
