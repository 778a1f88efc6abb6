use serde::{Deserialize, Serialize};
use std::fmt;

/// One comma-separated piece of a prompt, optionally weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSegment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl PromptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: None,
        }
    }

    pub fn weighted(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight: Some(weight),
        }
    }
}

pub type GenerationPrompt = Vec<PromptSegment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const SMALL: ImageSize = ImageSize {
        width: 512,
        height: 512,
    };
    pub const LARGE: ImageSize = ImageSize {
        width: 1024,
        height: 1024,
    };

    /// Sizes offered in the confirmation form, default first.
    pub const OPTIONS: [ImageSize; 2] = [ImageSize::SMALL, ImageSize::LARGE];

    /// Parses a selector value such as `"1024x1024"`. Anything that is not two
    /// positive integers around an `x` falls back to the default size.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('x');
        let width = parts.next()?.trim().parse::<u32>().ok()?;
        let height = parts.next()?.trim().parse::<u32>().ok()?;
        if parts.next().is_some() || width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Value stored in the select option.
    pub fn option_value(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Label shown to the user.
    pub fn label(&self) -> String {
        format!("{}×{}", self.width, self.height)
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::SMALL
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_large() {
        assert_eq!(
            ImageSize::parse_or_default("1024x1024"),
            ImageSize {
                width: 1024,
                height: 1024
            }
        );
    }

    #[test]
    fn test_unparseable_keeps_default() {
        for value in ["", "512×512", "big", "x", "10x", "0x512", "1x2x3", "-5x10"] {
            assert_eq!(ImageSize::parse_or_default(value), ImageSize::SMALL, "{value}");
        }
    }

    #[test]
    fn test_option_value_round_trips() {
        for size in ImageSize::OPTIONS {
            assert_eq!(ImageSize::parse(&size.option_value()), Some(size));
        }
    }

    #[test]
    fn test_unweighted_segment_omits_weight() {
        let json = serde_json::to_value(PromptSegment::new("sky")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "sky" }));
    }
}
