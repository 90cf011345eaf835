//! Classification rules as data.
//!
//! Rules are evaluated top to bottom and the first match wins. A rule
//! matches when any of its category keywords occurs in the category text,
//! or any of its text patterns matches the combined description,
//! categories and user comment.

use serde::{Deserialize, Serialize};

use super::AgeBand;

/// One entry of the ordered rule chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRule {
    pub name: String,
    /// Substrings searched for in the category text only.
    #[serde(default)]
    pub category_keywords: Vec<String>,
    /// Case-insensitive regular expressions searched for in the full text.
    #[serde(default)]
    pub text_patterns: Vec<String>,
    pub band: AgeBand,
    /// Marks the book as not a kids book, whatever the band says.
    #[serde(default)]
    pub adult: bool,
}

impl AgeRule {
    fn text(name: &str, pattern: &str, band: &str) -> Self {
        Self {
            name: name.to_string(),
            category_keywords: vec![],
            text_patterns: vec![pattern.to_string()],
            band: AgeBand::new(band),
            adult: false,
        }
    }
}

/// Ordered rule chain plus the mandatory default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierPolicy {
    #[serde(default = "default_band")]
    pub default_band: AgeBand,
    /// A band whose label matches this pattern counts as a kids band.
    #[serde(default = "default_kids_band_pattern")]
    pub kids_band_pattern: String,
    #[serde(default = "default_rules")]
    pub rules: Vec<AgeRule>,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            default_band: default_band(),
            kids_band_pattern: default_kids_band_pattern(),
            rules: default_rules(),
        }
    }
}

fn default_band() -> AgeBand {
    AgeBand::new(AgeBand::TODDLER)
}

fn default_kids_band_pattern() -> String {
    "[2-6]".to_string()
}

/// The standard rule chain: reading levels, then nursery/toddler,
/// early readers, independent readers and finally adult domains.
pub fn default_rules() -> Vec<AgeRule> {
    vec![
        AgeRule::text("reading-level-1", r"level\s*1", "3–4"),
        AgeRule::text("reading-level-2", r"level\s*2", "4–5"),
        AgeRule::text("reading-level-3", r"level\s*3", "5–6"),
        AgeRule::text("reading-level-4", r"level\s*4", "6–7"),
        AgeRule::text("reading-level-5", r"level\s*5", "7–8"),
        AgeRule {
            name: "nursery-toddler".to_string(),
            category_keywords: vec!["nursery".to_string()],
            text_patterns: vec!["toddler".to_string()],
            band: AgeBand::new(AgeBand::TODDLER),
            adult: false,
        },
        AgeRule {
            name: "early-reader".to_string(),
            category_keywords: vec!["phonics".to_string(), "early reader".to_string()],
            text_patterns: vec![r"ages? ?[45]".to_string()],
            band: AgeBand::new(AgeBand::EARLY_READER),
            adult: false,
        },
        AgeRule {
            name: "independent-reader".to_string(),
            category_keywords: vec!["independent reader".to_string()],
            text_patterns: vec![r"ages? ?[67]".to_string()],
            band: AgeBand::new(AgeBand::INDEPENDENT_READER),
            adult: false,
        },
        AgeRule {
            name: "adult-domain".to_string(),
            category_keywords: ["computer", "business", "science", "history"]
                .into_iter()
                .map(String::from)
                .collect(),
            text_patterns: vec![],
            band: AgeBand::new(AgeBand::TEEN_AND_ADULT),
            adult: true,
        },
    ]
}
