use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::aggregate::{BookRecord, PurchaseLink, ReconcileEvent, StoreError};
use crate::classifier::AgeBand;
use crate::metadata::LookupError;
use crate::quality::RejectionReason;

/// A user's submission, optionally pre-enriched by the caller.
///
/// When `age_band` is present the request is treated as pre-enriched:
/// lookup and classification are skipped and the supplied fields are
/// stored as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_band: Option<AgeBand>,
    #[serde(
        default,
        rename = "thumbnail",
        alias = "thumbnailUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_links: Option<Vec<PurchaseLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_kids_book: Option<bool>,
}

impl SubmissionRequest {
    pub fn new(title: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            comment: comment.into(),
            ..Default::default()
        }
    }

    pub fn is_pre_enriched(&self) -> bool {
        self.supplied_age_band().is_some()
    }

    /// Caller-supplied band, trimmed. A blank band counts as absent.
    pub fn supplied_age_band(&self) -> Option<AgeBand> {
        self.age_band
            .as_ref()
            .map(|band| band.as_str().trim())
            .filter(|band| !band.is_empty())
            .map(AgeBand::new)
    }
}

/// Where a submission is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Validating,
    Resolving,
    Classifying,
    Persisting,
    Reconciled,
    Rejected,
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionState::Validating => "validating",
            SubmissionState::Resolving => "resolving",
            SubmissionState::Classifying => "classifying",
            SubmissionState::Persisting => "persisting",
            SubmissionState::Reconciled => "reconciled",
            SubmissionState::Rejected => "rejected",
            SubmissionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A successful pipeline run: the stored record and the event to fold
/// into client-side aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub record: BookRecord,
    pub event: ReconcileEvent,
}

impl SubmissionOutcome {
    pub fn from_event(event: ReconcileEvent) -> Self {
        Self {
            record: event.record().clone(),
            event,
        }
    }
}

/// Input problems caught before any side effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0}")]
    CommentRejected(RejectionReason),
}

/// The title could not be turned into catalog metadata.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not find '{0}'; check the spelling and try again")]
    Unverified(String),

    #[error("book lookup failed, please try again: {0}")]
    Lookup(#[from] LookupError),
}

/// Why a submission, like or added reason did not reach the store.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("could not save the book: {0}")]
    Persistence(StoreError),

    #[error("no book titled '{0}'")]
    NotFound(String),
}

impl From<StoreError> for SubmissionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(title) => SubmissionError::NotFound(title),
            other => SubmissionError::Persistence(other),
        }
    }
}

impl SubmissionError {
    /// Stable wire code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Validation(ValidationError::MissingField(_)) => "missing-field",
            SubmissionError::Validation(ValidationError::CommentRejected(_)) => "comment-rejected",
            SubmissionError::Resolution(ResolutionError::Unverified(_)) => "verification-failed",
            SubmissionError::Resolution(ResolutionError::Lookup(_)) => "lookup-failed",
            SubmissionError::Persistence(_) => "persistence-failed",
            SubmissionError::NotFound(_) => "not-found",
        }
    }

    /// Pipeline state this error terminates in.
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionError::Validation(_)
            | SubmissionError::Resolution(ResolutionError::Unverified(_))
            | SubmissionError::NotFound(_) => SubmissionState::Rejected,
            SubmissionError::Resolution(ResolutionError::Lookup(_))
            | SubmissionError::Persistence(_) => SubmissionState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_camel_case_enrichment() {
        let json = r#"{
            "title": "Corduroy",
            "comment": "A bear and his missing button",
            "ageBand": "4–5",
            "thumbnail": "http://thumb",
            "purchaseLinks": [{"name": "Shop", "url": "https://shop"}],
            "isKidsBook": false
        }"#;
        let request: SubmissionRequest = serde_json::from_str(json).unwrap();
        assert!(request.is_pre_enriched());
        assert_eq!(request.age_band, Some(AgeBand::new("4–5")));
        assert_eq!(request.thumbnail_url.as_deref(), Some("http://thumb"));
        assert_eq!(request.purchase_links.as_ref().map(Vec::len), Some(1));
        assert_eq!(request.is_kids_book, Some(false));
    }

    #[test]
    fn test_blank_age_band_is_not_pre_enriched() {
        let request: SubmissionRequest =
            serde_json::from_str(r#"{"title": "X", "comment": "y", "ageBand": "   "}"#).unwrap();
        assert!(!request.is_pre_enriched());
        assert_eq!(request.supplied_age_band(), None);

        let request: SubmissionRequest =
            serde_json::from_str(r#"{"title": "X", "comment": "y", "ageBand": " 6+ "}"#).unwrap();
        assert_eq!(request.supplied_age_band(), Some(AgeBand::new("6+")));
    }

    #[test]
    fn test_request_missing_fields_default_to_empty() {
        let request: SubmissionRequest = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        assert_eq!(request.comment, "");
        assert!(!request.is_pre_enriched());
    }

    #[test]
    fn test_error_kinds() {
        let cases: Vec<(SubmissionError, &str)> = vec![
            (ValidationError::MissingField("title").into(), "missing-field"),
            (
                ValidationError::CommentRejected(RejectionReason::DeniedPhrase {
                    phrase: "meh".to_string(),
                })
                .into(),
                "comment-rejected",
            ),
            (
                ResolutionError::Unverified("asdf".to_string()).into(),
                "verification-failed",
            ),
            (
                ResolutionError::Lookup(LookupError::RateLimitExceeded).into(),
                "lookup-failed",
            ),
            (
                StoreError::Database("locked".to_string()).into(),
                "persistence-failed",
            ),
            (StoreError::NotFound("ghost".to_string()).into(), "not-found"),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{}", error);
        }
    }

    #[test]
    fn test_error_states() {
        let rejected: SubmissionError = ValidationError::MissingField("comment").into();
        assert_eq!(rejected.state(), SubmissionState::Rejected);
        let failed: SubmissionError = StoreError::Database("x".to_string()).into();
        assert_eq!(failed.state(), SubmissionState::Failed);
    }

    #[test]
    fn test_unverified_title_is_rejected_but_lookup_failure_is_failed() {
        let unverified: SubmissionError =
            ResolutionError::Unverified("Qwxz Plonk".to_string()).into();
        assert_eq!(unverified.state(), SubmissionState::Rejected);

        let lookup: SubmissionError =
            ResolutionError::Lookup(LookupError::RateLimitExceeded).into();
        assert_eq!(lookup.state(), SubmissionState::Failed);

        let missing: SubmissionError = StoreError::NotFound("ghost".to_string()).into();
        assert_eq!(missing.state(), SubmissionState::Rejected);
    }
}
