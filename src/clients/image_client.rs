use crate::{
    clients::traits::ImageGenerator,
    config::StabilityConfig,
    error::{BotError, Result},
    logger,
    models::{
        GeneratedImage, StabilityGenerationResponse, StabilityTextToImageBody, TextToImageRequest,
    },
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;

pub const DEFAULT_ENGINE_ID: &str = "stable-diffusion-xl-beta-v2-2-2";
pub const DEFAULT_CFG_SCALE: f32 = 7.0;
pub const DEFAULT_STEPS: u32 = 30;
pub const DEFAULT_SAMPLES: u32 = 1;
pub const DEFAULT_CLIP_GUIDANCE_PRESET: &str = "FAST_BLUE";

/// Stability REST client (`/v1/generation/{engine}/text-to-image`).
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_key: String,
    api_host: String,
    engine_id: String,
}

impl ImageClient {
    pub fn new(client: Client, config: &StabilityConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BotError::ConfigError("Missing Stability API key.".into()))?;

        Ok(Self {
            client,
            api_key,
            api_host: config.api_host.trim_end_matches('/').to_string(),
            engine_id: config
                .engine_id
                .clone()
                .unwrap_or_else(|| DEFAULT_ENGINE_ID.to_string()),
        })
    }

    fn endpoint(&self, engine_id: &str) -> String {
        format!(
            "{}/v1/generation/{}/text-to-image",
            self.api_host, engine_id
        )
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn text_to_image(&self, request: TextToImageRequest) -> Result<Vec<GeneratedImage>> {
        let engine_id = request.engine_id.as_deref().unwrap_or(&self.engine_id);

        let body = StabilityTextToImageBody {
            text_prompts: &request.prompts,
            cfg_scale: DEFAULT_CFG_SCALE,
            clip_guidance_preset: DEFAULT_CLIP_GUIDANCE_PRESET,
            height: request.height,
            width: request.width,
            samples: DEFAULT_SAMPLES,
            steps: DEFAULT_STEPS,
        };

        log::info!(
            "Generating {}x{} image with engine: {}",
            request.width,
            request.height,
            engine_id
        );
        log::debug!("Text-to-image payload: {}", serde_json::to_string(&body)?);
        let _timer = logger::timer("text-to-image");

        let response = self
            .client
            .post(self.endpoint(engine_id))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::RequestError(format!("Stability request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::UpstreamError {
                service: "stability",
                status: status.as_u16(),
                body: format!("Non-200 response: {}", body),
            });
        }

        let generation: StabilityGenerationResponse = response
            .json()
            .await
            .map_err(|e| BotError::ResponseError(e.to_string()))?;

        generation
            .artifacts
            .into_iter()
            .enumerate()
            .map(|(index, artifact)| {
                log::debug!(
                    "Artifact {} seed={:?} finish_reason={:?}",
                    index,
                    artifact.seed,
                    artifact.finish_reason
                );
                STANDARD
                    .decode(artifact.base64.as_bytes())
                    .map(|data| GeneratedImage { index, data })
                    .map_err(|e| {
                        BotError::ResponseError(format!("Artifact {} is not base64: {}", index, e))
                    })
            })
            .collect()
    }
}
