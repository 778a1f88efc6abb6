use crate::models::{GenerationPrompt, PromptSegment};

/// Splits `"sky:0.8, sea, sunset"` into prompt segments.
///
/// A segment is weighted only when the part after its first colon parses to a
/// non-zero number. A zero weight counts as "not a number", so `"sky:0"` stays
/// one unweighted segment with the colon kept in its text. Segment text is
/// kept exactly as typed, surrounding spaces included.
pub fn format_prompt(text: &str) -> GenerationPrompt {
    text.split(',').map(parse_segment).collect()
}

fn parse_segment(segment: &str) -> PromptSegment {
    let mut parts = segment.split(':');
    let head = parts.next().unwrap_or_default();

    match parts.next().and_then(parse_weight) {
        Some(weight) => PromptSegment::weighted(head, weight),
        None => PromptSegment::new(segment),
    }
}

fn parse_weight(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|weight| !weight.is_nan() && *weight != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_segment() {
        assert_eq!(format_prompt("sky:0.8"), vec![PromptSegment::weighted("sky", 0.8)]);
    }

    #[test]
    fn test_zero_weight_is_kept_as_text() {
        // Zero is rejected like any non-number, so the colon survives in the text.
        assert_eq!(format_prompt("sky:0"), vec![PromptSegment::new("sky:0")]);
        assert_eq!(format_prompt("sky:0.0"), vec![PromptSegment::new("sky:0.0")]);
    }

    #[test]
    fn test_segment_count_matches_commas() {
        let input = "Amazon, Jungle:1.2, Dense Rainforest, , style: watercolor";
        let prompts = format_prompt(input);
        assert_eq!(prompts.len(), input.split(',').count());
        assert_eq!(prompts[1], PromptSegment::weighted(" Jungle", 1.2));
        assert_eq!(prompts[3], PromptSegment::new(" "));
        assert_eq!(prompts[4], PromptSegment::new(" style: watercolor"));
    }

    #[test]
    fn test_negative_weight_is_numeric() {
        assert_eq!(
            format_prompt("blurry:-1"),
            vec![PromptSegment::weighted("blurry", -1.0)]
        );
    }

    #[test]
    fn test_extra_colons_use_second_part() {
        assert_eq!(
            format_prompt("ratio:2:3"),
            vec![PromptSegment::weighted("ratio", 2.0)]
        );
        assert_eq!(format_prompt("a:b:0.5"), vec![PromptSegment::new("a:b:0.5")]);
    }

    #[test]
    fn test_segment_text_is_kept_verbatim() {
        assert_eq!(
            format_prompt("a, sky:0"),
            vec![PromptSegment::new("a"), PromptSegment::new(" sky:0")]
        );
        assert_eq!(
            format_prompt("a, sea: 0.5"),
            vec![PromptSegment::new("a"), PromptSegment::weighted(" sea", 0.5)]
        );
    }

    #[test]
    fn test_plain_text_has_no_weight() {
        assert_eq!(format_prompt("a cat"), vec![PromptSegment::new("a cat")]);
    }
}
