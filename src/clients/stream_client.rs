//! Streaming variant of the image generator.
//!
//! A generation request is a nested structure (image parameters, step/sampler
//! parameters, transform, weighted prompts) sent once over a duplex stream.
//! The stream answers with `Data`, `Status` and `End` events; see
//! [`execute_generation_request`] for how those settle into one result.

use crate::{
    clients::{
        image_client::{DEFAULT_CFG_SCALE, DEFAULT_ENGINE_ID, DEFAULT_SAMPLES, DEFAULT_STEPS},
        traits::ImageGenerator,
    },
    error::{BotError, Result},
    models::{GeneratedImage, PromptSegment, TextToImageRequest},
};
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

/// Weight given to prompts that do not carry one.
pub const DEFAULT_PROMPT_WEIGHT: f32 = 0.5;
pub const DEFAULT_WIDTH: u32 = 512;
pub const DEFAULT_HEIGHT: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffusionSampler {
    SamplerDdim,
    SamplerDdpm,
    SamplerKEuler,
    SamplerKEulerAncestral,
    SamplerKHeun,
    SamplerKDpm2,
    SamplerKDpm2Ancestral,
    SamplerKLms,
    SamplerKDpmppSde,
    #[default]
    SamplerKDpmpp2m,
    SamplerKDpmpp2sAncestral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerParameters {
    pub cfg_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepParameter {
    pub sampler: SamplerParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformType {
    pub diffusion: DiffusionSampler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageParameters {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub steps: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed: Vec<u32>,
    pub parameters: Vec<StepParameter>,
    pub transform: TransformType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptParameters {
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    pub parameters: PromptParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub engine_id: String,
    pub image: ImageParameters,
    pub prompt: Vec<Prompt>,
}

/// Caller-facing knobs; unset fields take the module defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub prompts: Vec<PromptSegment>,
    pub width: u32,
    pub height: u32,
    pub samples: Option<u32>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f32>,
    pub sampler: Option<DiffusionSampler>,
    pub seed: Option<u32>,
}

pub fn build_generation_request(engine_id: &str, params: GenerationParams) -> GenerationRequest {
    let step = StepParameter {
        sampler: SamplerParameters {
            cfg_scale: params.cfg_scale.unwrap_or(DEFAULT_CFG_SCALE),
        },
    };

    let image = ImageParameters {
        width: non_zero_or(params.width, DEFAULT_WIDTH),
        height: non_zero_or(params.height, DEFAULT_HEIGHT),
        samples: params.samples.unwrap_or(DEFAULT_SAMPLES),
        steps: params.steps.unwrap_or(DEFAULT_STEPS),
        seed: params.seed.into_iter().collect(),
        parameters: vec![step],
        transform: TransformType {
            diffusion: params.sampler.unwrap_or_default(),
        },
    };

    let prompt = params
        .prompts
        .into_iter()
        .map(|segment| Prompt {
            text: segment.text,
            parameters: PromptParameters {
                weight: segment
                    .weight
                    .filter(|weight| *weight != 0.0)
                    .unwrap_or(DEFAULT_PROMPT_WEIGHT),
            },
        })
        .collect();

    GenerationRequest {
        engine_id: engine_id.to_string(),
        image,
        prompt,
    }
}

fn non_zero_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    #[default]
    ArtifactImage,
    ArtifactText,
    ArtifactClassifications,
    ArtifactMask,
    ArtifactLatent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type", default)]
    pub kind: ArtifactType,
    pub binary: Vec<u8>,
    pub seed: Option<u32>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Answer {
    pub answer_id: Option<String>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    pub code: i32,
    pub details: String,
}

impl StreamStatus {
    pub const OK: i32 = 0;

    pub fn ok() -> Self {
        Self {
            code: Self::OK,
            details: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Data(Answer),
    Status(StreamStatus),
    /// Stream closed; `None` means the transport reported no status at all.
    End(Option<StreamStatus>),
}

/// Opens the duplex generation stream for one request.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<BoxStream<'static, StreamEvent>>;
}

/// Sends `request` and settles on the first terminal event.
///
/// The first `Data` event resolves. A non-OK `Status`, or an `End` without an
/// OK status, rejects only if it arrives before any data. Once settled the
/// stream is dropped, so a bad status following the data is never observed.
/// A stream that closes without delivering data rejects.
pub async fn execute_generation_request<T>(transport: &T, request: GenerationRequest) -> Result<Answer>
where
    T: GenerationTransport + ?Sized,
{
    let mut stream = transport.generate(request).await?;

    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Data(answer) => {
                log::debug!("Generation stream delivered {} artifacts", answer.artifacts.len());
                return Ok(answer);
            }
            StreamEvent::Status(status) => {
                log::debug!("Generation stream status: {}", status.code);
                if !status.is_ok() {
                    return Err(BotError::StreamError(format!(
                        "status {}: {}",
                        status.code, status.details
                    )));
                }
            }
            StreamEvent::End(status) => {
                log::debug!("Generation stream end: {:?}", status.as_ref().map(|s| s.code));
                match status {
                    Some(status) if status.is_ok() => {}
                    Some(status) => {
                        return Err(BotError::StreamError(format!(
                            "ended with status {}: {}",
                            status.code, status.details
                        )))
                    }
                    None => {
                        return Err(BotError::StreamError("ended without a status".into()))
                    }
                }
            }
        }
    }

    Err(BotError::StreamError(
        "stream closed before any data arrived".into(),
    ))
}

/// [`ImageGenerator`] backed by a [`GenerationTransport`].
pub struct StreamingImageClient<T> {
    transport: T,
    engine_id: String,
}

impl<T: GenerationTransport> StreamingImageClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            engine_id: DEFAULT_ENGINE_ID.to_string(),
        }
    }

    pub fn with_engine(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = engine_id.into();
        self
    }
}

#[async_trait]
impl<T: GenerationTransport> ImageGenerator for StreamingImageClient<T> {
    async fn text_to_image(&self, request: TextToImageRequest) -> Result<Vec<GeneratedImage>> {
        let engine_id = request.engine_id.as_deref().unwrap_or(&self.engine_id);
        log::info!("Streaming text-to-image request to engine: {}", engine_id);

        let generation = build_generation_request(
            engine_id,
            GenerationParams {
                prompts: request.prompts,
                width: request.width,
                height: request.height,
                ..Default::default()
            },
        );

        let answer = execute_generation_request(&self.transport, generation).await?;

        Ok(answer
            .artifacts
            .into_iter()
            .filter(|artifact| artifact.kind == ArtifactType::ArtifactImage)
            .enumerate()
            .map(|(index, artifact)| GeneratedImage {
                index,
                data: artifact.binary,
            })
            .collect())
    }
}
