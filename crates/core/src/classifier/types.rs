use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse audience bucket, e.g. `2–3`, `4–5`, `6+`, `12+`.
///
/// Bands are policy data, so this is an open label rather than a closed
/// enum. Labels use an en dash between bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeBand(String);

impl AgeBand {
    pub const TODDLER: &'static str = "2–3";
    pub const EARLY_READER: &'static str = "4–5";
    pub const INDEPENDENT_READER: &'static str = "6+";
    pub const TEEN_AND_ADULT: &'static str = "12+";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Collapse any band (including legacy free-form labels like
    /// `"ages 4 and up"`) to one of the display buckets
    /// `2–3`, `4–5`, `6+` or `12+`.
    ///
    /// The first number in the label decides; labels without a number
    /// fall back to `2–3`.
    pub fn bucket(&self) -> AgeBand {
        let first_number = self
            .0
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse::<u32>().ok());

        let label = match first_number {
            Some(n) if n >= 12 => Self::TEEN_AND_ADULT,
            Some(n) if n >= 6 => Self::INDEPENDENT_READER,
            Some(4) | Some(5) => Self::EARLY_READER,
            _ => Self::TODDLER,
        };
        AgeBand::new(label)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgeBand {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Display category a book is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Kids,
    Other,
}

impl Category {
    pub fn from_kids_flag(is_kids_book: bool) -> Self {
        if is_kids_book {
            Category::Kids
        } else {
            Category::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Kids => "Kids",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive parse of `"kids"` / `"other"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kids" => Some(Category::Kids),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub age_band: AgeBand,
    pub is_kids_book: bool,
    /// Name of the rule that decided the band; `None` means the default band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl Classification {
    pub fn category(&self) -> Category {
        Category::from_kids_flag(self.is_kids_book)
    }
}
