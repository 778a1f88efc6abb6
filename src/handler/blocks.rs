use crate::models::{ImageSize, GENERATE_ACTION, IMAGE_SIZE_ACTION, PROMPT_INPUT_ACTION};
use serde_json::{json, Value};

pub const USAGE_HINT: &str = "Please mention me together with a message describing the image you want.";
pub const UPLOAD_FAILED_MESSAGE: &str =
    "Failed to upload the generated images. Please contact the developer.";

/// User-facing error text; the raw error is appended for operators.
pub fn error_message(error: &impl std::fmt::Display) -> String {
    format!(
        "An error occurred. Please contact the developer.\n {}",
        error
    )
}

pub fn usage_hint_blocks() -> Value {
    json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": USAGE_HINT }
        }
    ])
}

fn size_option(size: ImageSize) -> Value {
    json!({
        "text": { "type": "plain_text", "text": size.label(), "emoji": true },
        "value": size.option_value()
    })
}

/// Editable prompt, size selector and generate button, posted under the mention.
pub fn confirmation_blocks(prompt: &str) -> Value {
    let options: Vec<Value> = ImageSize::OPTIONS.into_iter().map(size_option).collect();

    json!([
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "I generated a prompt from your message. Edit it if needed.\n Then choose an image size and press Generate."
            }
        },
        {
            "type": "input",
            "element": {
                "type": "plain_text_input",
                "multiline": true,
                "action_id": PROMPT_INPUT_ACTION,
                "initial_value": prompt
            },
            "label": { "type": "plain_text", "text": "Prompt", "emoji": true }
        },
        {
            "type": "input",
            "element": {
                "type": "static_select",
                "placeholder": { "type": "plain_text", "text": "Select an item", "emoji": true },
                "initial_option": size_option(ImageSize::default()),
                "options": options,
                "action_id": IMAGE_SIZE_ACTION
            },
            "label": { "type": "plain_text", "text": "Image size", "emoji": true }
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Generate", "emoji": true },
                    "style": "primary",
                    "value": GENERATE_ACTION,
                    "action_id": GENERATE_ACTION
                }
            ]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_prefills_prompt() {
        let blocks = confirmation_blocks("Amazon, Jungle");
        assert_eq!(blocks[1]["element"]["initial_value"], "Amazon, Jungle");
        assert_eq!(blocks[1]["element"]["action_id"], "prompt_input");
    }

    #[test]
    fn test_size_selector_defaults_to_small() {
        let blocks = confirmation_blocks("x");
        let select = &blocks[2]["element"];
        assert_eq!(select["action_id"], "select_image_size");
        assert_eq!(select["initial_option"]["value"], "512x512");
        let values: Vec<&str> = select["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|option| option["value"].as_str().unwrap())
            .collect();
        assert_eq!(values, vec!["512x512", "1024x1024"]);
    }

    #[test]
    fn test_generate_button() {
        let blocks = confirmation_blocks("x");
        assert_eq!(blocks[3]["elements"][0]["action_id"], "gen_image");
    }

    #[test]
    fn test_error_message_appends_error() {
        assert!(error_message(&"boom").ends_with("\n boom"));
    }
}
