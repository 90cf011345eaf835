//! Comment quality gate.
//!
//! Accepts or rejects the free-text reason attached to a submission.
//! Rejections are values, not errors: the caller decides how to report them.

mod policy;

pub use policy::{default_deny_list, QualityPolicy};

pub use crate::policy::PolicyError;

use regex_lite::{Regex, RegexBuilder};
use serde::Serialize;

/// Why a comment was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Fewer characters than the policy minimum.
    TooShort { length: usize, min_length: usize },
    /// The whole comment is a deny-listed phrase.
    DeniedPhrase { phrase: String },
    /// A short comment containing a deny-listed word.
    ShortWithDeniedWord { word: String },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::TooShort { min_length, .. } => write!(
                f,
                "comment must be at least {} characters long",
                min_length
            ),
            RejectionReason::DeniedPhrase { .. } | RejectionReason::ShortWithDeniedWord { .. } => {
                write!(f, "please tell us a bit more about why you love this book")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityVerdict {
    Accepted,
    Rejected(RejectionReason),
}

impl QualityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, QualityVerdict::Accepted)
    }
}

struct DenyEntry {
    phrase: String,
    word: Regex,
}

/// A comment after trimming and case-folding.
struct Normalized<'a> {
    text: &'a str,
    length: usize,
}

type Check = fn(&QualityGate, &Normalized<'_>) -> Option<RejectionReason>;

/// Checks run top to bottom; the first rejection wins, otherwise accept.
const CHECKS: &[Check] = &[
    QualityGate::check_length,
    QualityGate::check_exact_phrase,
    QualityGate::check_short_with_word,
];

/// Pure accept/reject predicate over user comments.
pub struct QualityGate {
    min_length: usize,
    short_length: usize,
    deny: Vec<DenyEntry>,
}

impl QualityGate {
    pub fn new(policy: QualityPolicy) -> Result<Self, PolicyError> {
        let deny = policy
            .deny_list
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let phrase = entry.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(PolicyError::BlankDenyEntry(index));
                }
                // Whole-word match; entries may start or end with punctuation.
                let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex_lite::escape(&phrase));
                let word = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PolicyError::InvalidPattern {
                        rule: format!("deny_list[{}]", index),
                        message: e.to_string(),
                    })?;
                Ok(DenyEntry { phrase, word })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            min_length: policy.min_length,
            short_length: policy.short_length,
            deny,
        })
    }

    /// Judge a comment.
    pub fn check(&self, comment: &str) -> QualityVerdict {
        let text = comment.trim().to_lowercase();
        let normalized = Normalized {
            length: text.chars().count(),
            text: &text,
        };

        CHECKS
            .iter()
            .find_map(|check| check(self, &normalized))
            .map_or(QualityVerdict::Accepted, QualityVerdict::Rejected)
    }

    fn check_length(&self, comment: &Normalized<'_>) -> Option<RejectionReason> {
        (comment.length < self.min_length).then(|| RejectionReason::TooShort {
            length: comment.length,
            min_length: self.min_length,
        })
    }

    fn check_exact_phrase(&self, comment: &Normalized<'_>) -> Option<RejectionReason> {
        self.deny
            .iter()
            .find(|entry| entry.phrase == comment.text)
            .map(|entry| RejectionReason::DeniedPhrase {
                phrase: entry.phrase.clone(),
            })
    }

    fn check_short_with_word(&self, comment: &Normalized<'_>) -> Option<RejectionReason> {
        if comment.length >= self.short_length {
            return None;
        }
        self.deny
            .iter()
            .find(|entry| entry.word.is_match(comment.text))
            .map(|entry| RejectionReason::ShortWithDeniedWord {
                word: entry.phrase.clone(),
            })
    }
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(QualityPolicy::default()).expect("default quality policy compiles")
    }
}
