use serde::{Deserialize, Serialize};

/// Tunable thresholds and deny-list for the comment quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QualityPolicy {
    /// Comments shorter than this (in characters, after trimming) are rejected.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Comments shorter than this are also checked for deny-listed words.
    #[serde(default = "default_short_length")]
    pub short_length: usize,
    /// Low-information phrases and words.
    #[serde(default = "default_deny_list")]
    pub deny_list: Vec<String>,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            short_length: default_short_length(),
            deny_list: default_deny_list(),
        }
    }
}

fn default_min_length() -> usize {
    10
}

fn default_short_length() -> usize {
    25
}

/// Placeholders, generic praise and profanity stand-ins.
pub fn default_deny_list() -> Vec<String> {
    [
        // placeholders
        "asdf",
        "test",
        "123",
        "abc",
        "qwerty",
        "lorem ipsum",
        "meaningful blabber",
        // generic praise
        "cool",
        "nice",
        "good",
        "great",
        "great book",
        "good book",
        "fun read",
        "awesome",
        "interesting",
        "ok",
        "fine",
        "love it",
        // generic dislike
        "hate it",
        "boring",
        "bad",
        "terrible",
        "meh",
        // profanity and insults
        "crap",
        "junk",
        "f***",
        "sex",
        "sexy",
        "stupid",
        "dumb",
        "idiot",
        "nonsense",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
