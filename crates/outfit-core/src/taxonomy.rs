//! The fixed classification taxonomy.
//!
//! Every value a provider may return is enumerated here. Anything outside
//! these lists is a validation failure, never a new category.

use serde::{Deserialize, Serialize};

/// Garment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Outer,
    Dress,
    Footwear,
    Bag,
    Accessory,
    Other,
}

impl Category {
    /// All allowed values, in prompt order.
    pub const ALL: [Category; 8] = [
        Category::Top,
        Category::Bottom,
        Category::Outer,
        Category::Dress,
        Category::Footwear,
        Category::Bag,
        Category::Accessory,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Outer => "outer",
            Category::Dress => "dress",
            Category::Footwear => "footwear",
            Category::Bag => "bag",
            Category::Accessory => "accessory",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// Dress code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DressCode {
    Casual,
    Business,
    Party,
    Sports,
    Formal,
    Other,
}

impl DressCode {
    /// All allowed values, in prompt order.
    pub const ALL: [DressCode; 6] = [
        DressCode::Casual,
        DressCode::Business,
        DressCode::Party,
        DressCode::Sports,
        DressCode::Formal,
        DressCode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DressCode::Casual => "casual",
            DressCode::Business => "business",
            DressCode::Party => "party",
            DressCode::Sports => "sports",
            DressCode::Formal => "formal",
            DressCode::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == s)
    }
}

/// Season a garment suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// All allowed values, in prompt order.
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Fall,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s2| s2.as_str() == s)
    }
}

/// Join taxonomy values into the quoted list form used in prompts and
/// error messages, e.g. `"top", "bottom", ...`.
pub fn quoted_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated classification for a single garment image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Primary color as a `#RRGGBB` hex code
    pub color: String,

    /// Garment category
    pub category: Category,

    /// Dress code
    pub dresscode: DressCode,

    /// One or more seasons, duplicates collapsed, prompt order not required
    pub season: Vec<Season>,
}

/// Check a color string is `#` followed by exactly six hex digits.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("hat"), None);
        assert_eq!(Category::parse("Top"), None); // case-sensitive
    }

    #[test]
    fn test_dresscode_roundtrip() {
        for d in DressCode::ALL {
            assert_eq!(DressCode::parse(d.as_str()), Some(d));
        }
        assert_eq!(DressCode::parse("smart-casual"), None);
    }

    #[test]
    fn test_season_roundtrip() {
        for s in Season::ALL {
            assert_eq!(Season::parse(s.as_str()), Some(s));
        }
        assert_eq!(Season::parse("autumn"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Category::Footwear).unwrap();
        assert_eq!(json, "\"footwear\"");
        let parsed: Season = serde_json::from_str("\"winter\"").unwrap();
        assert_eq!(parsed, Season::Winter);
    }

    #[test]
    fn test_quoted_list() {
        assert_eq!(quoted_list(&["a", "b"]), "\"a\", \"b\"");
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#FF0000"));
        assert!(is_hex_color("#a1b2c3"));
        assert!(!is_hex_color("FF0000"));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("#GG0000"));
        assert!(!is_hex_color("#FF00001"));
        assert!(!is_hex_color(""));
    }

    #[test]
    fn test_classification_serde() {
        let c = Classification {
            color: "#1A2B3C".to_string(),
            category: Category::Outer,
            dresscode: DressCode::Formal,
            season: vec![Season::Fall, Season::Winter],
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"category\":\"outer\""));
        assert!(json.contains("\"season\":[\"fall\",\"winter\"]"));
        let back: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
