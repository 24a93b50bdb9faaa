//! Strict validation of provider replies against the taxonomy.
//!
//! Nothing is coerced or defaulted: a missing key, a type mismatch, or a
//! value outside its enumeration fails the item with a message naming the
//! offending field.

use crate::error::PipelineError;
use crate::taxonomy::{
    is_hex_color, quoted_list, Category, Classification, DressCode, Season,
};

const REQUIRED_KEYS: [&str; 4] = ["color", "category", "dresscode", "season"];

/// Parse and validate a provider reply into a `Classification`.
///
/// Tolerates a Markdown-fenced ```json block around the object, since
/// providers without a JSON response mode sometimes wrap their output.
pub fn parse_classification(text: &str) -> Result<Classification, PipelineError> {
    let cleaned = strip_code_fence(text);

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| validation(format!("Reply is not valid JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| validation("Reply is not a JSON object".to_string()))?;

    for key in REQUIRED_KEYS {
        if !obj.contains_key(key) {
            return Err(validation(format!("Missing required key: {key}")));
        }
    }

    let color = obj["color"]
        .as_str()
        .ok_or_else(|| validation("'color' must be a string".to_string()))?;
    if !is_hex_color(color) {
        return Err(validation(format!(
            "Invalid color format: {color:?} (expected \"#RRGGBB\")"
        )));
    }

    let category_str = obj["category"]
        .as_str()
        .ok_or_else(|| validation("'category' must be a string".to_string()))?;
    let category = Category::parse(category_str).ok_or_else(|| {
        let allowed: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        validation(format!(
            "Invalid category value: {category_str:?}. Allowed: {}",
            quoted_list(&allowed)
        ))
    })?;

    let dresscode_str = obj["dresscode"]
        .as_str()
        .ok_or_else(|| validation("'dresscode' must be a string".to_string()))?;
    let dresscode = DressCode::parse(dresscode_str).ok_or_else(|| {
        let allowed: Vec<&str> = DressCode::ALL.iter().map(|d| d.as_str()).collect();
        validation(format!(
            "Invalid dresscode value: {dresscode_str:?}. Allowed: {}",
            quoted_list(&allowed)
        ))
    })?;

    let season_values = obj["season"]
        .as_array()
        .ok_or_else(|| validation("'season' must be an array".to_string()))?;
    if season_values.is_empty() {
        return Err(validation("'season' must contain at least one value".to_string()));
    }

    let mut season = Vec::new();
    for value in season_values {
        let season_str = value
            .as_str()
            .ok_or_else(|| validation("'season' entries must be strings".to_string()))?;
        let parsed = Season::parse(season_str).ok_or_else(|| {
            let allowed: Vec<&str> = Season::ALL.iter().map(|s| s.as_str()).collect();
            validation(format!(
                "Invalid season value: {season_str:?}. Allowed: {}",
                quoted_list(&allowed)
            ))
        })?;
        // Season is a set; collapse duplicates keeping first occurrence
        if !season.contains(&parsed) {
            season.push(parsed);
        }
    }

    Ok(Classification {
        color: color.to_string(),
        category,
        dresscode,
        season,
    })
}

fn validation(message: String) -> PipelineError {
    PipelineError::Validation(message)
}

/// Strip a surrounding Markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline
    let rest = rest.split_once('\n').map(|(_, r)| r).unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r##"{
        "color": "#FF0000",
        "category": "outer",
        "dresscode": "formal",
        "season": ["fall", "winter"]
    }"##;

    #[test]
    fn test_valid_reply_parses() {
        let c = parse_classification(VALID).unwrap();
        assert_eq!(c.color, "#FF0000");
        assert_eq!(c.category, Category::Outer);
        assert_eq!(c.dresscode, DressCode::Formal);
        assert_eq!(c.season, vec![Season::Fall, Season::Winter]);
    }

    #[test]
    fn test_fenced_reply_parses() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_classification(&fenced).is_ok());

        let bare_fence = format!("```\n{VALID}\n```");
        assert!(parse_classification(&bare_fence).is_ok());
    }

    #[test]
    fn test_not_json_rejected() {
        let err = parse_classification("a red coat for winter").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_classification("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_missing_key_rejected() {
        for key in ["color", "category", "dresscode", "season"] {
            let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
            value.as_object_mut().unwrap().remove(key);
            let err = parse_classification(&value.to_string()).unwrap_err();
            assert!(
                err.to_string().contains(&format!("Missing required key: {key}")),
                "wrong error for {key}: {err}"
            );
        }
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let reply = r#"{"color": 16711680, "category": "top", "dresscode": "casual", "season": ["summer"]}"#;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("'color' must be a string"));

        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": "summer"}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("'season' must be an array"));

        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": [1]}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("'season' entries must be strings"));
    }

    #[test]
    fn test_bad_hex_color_rejected() {
        for color in ["FF0000", "#F00", "#GGGGGG", "red"] {
            let reply = format!(
                r#"{{"color": "{color}", "category": "top", "dresscode": "casual", "season": ["summer"]}}"#
            );
            let err = parse_classification(&reply).unwrap_err();
            assert!(err.to_string().contains("Invalid color format"), "{color}");
        }
    }

    #[test]
    fn test_out_of_taxonomy_rejected() {
        let reply = r##"{"color": "#FF0000", "category": "hat", "dresscode": "casual", "season": ["summer"]}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("Invalid category value"));

        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "loungewear", "season": ["summer"]}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("Invalid dresscode value"));

        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": ["monsoon"]}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("Invalid season value"));
    }

    #[test]
    fn test_empty_season_rejected() {
        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": []}"##;
        let err = parse_classification(reply).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn test_duplicate_seasons_collapsed() {
        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": ["winter", "winter", "fall"]}"##;
        let c = parse_classification(reply).unwrap();
        assert_eq!(c.season, vec![Season::Winter, Season::Fall]);
    }

    #[test]
    fn test_extra_keys_tolerated() {
        let reply = r##"{"color": "#FF0000", "category": "top", "dresscode": "casual", "season": ["summer"], "confidence": 0.9}"##;
        assert!(parse_classification(reply).is_ok());
    }
}
