//! Audience classification.
//!
//! Derives an age band and the kids/other category from resolved
//! metadata and the user's comment. Classification is pure and total:
//! every input gets a band, falling back to the policy default.

mod policy;
mod types;

pub use policy::{default_rules, AgeRule, ClassifierPolicy};
pub use types::{AgeBand, Category, Classification};

pub use crate::policy::PolicyError;

use regex_lite::{Regex, RegexBuilder};

use crate::metadata::ResolvedMetadata;

struct CompiledRule {
    name: String,
    category_keywords: Vec<String>,
    patterns: Vec<Regex>,
    band: AgeBand,
    adult: bool,
}

impl CompiledRule {
    fn compile(rule: &AgeRule) -> Result<Self, PolicyError> {
        if rule.category_keywords.is_empty() && rule.text_patterns.is_empty() {
            return Err(PolicyError::EmptyRule(rule.name.clone()));
        }

        let patterns = rule
            .text_patterns
            .iter()
            .map(|p| compile_pattern(&rule.name, p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: rule.name.clone(),
            category_keywords: rule
                .category_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            patterns,
            band: rule.band.clone(),
            adult: rule.adult,
        })
    }

    fn matches(&self, category_text: &str, full_text: &str) -> bool {
        self.category_keywords
            .iter()
            .any(|k| category_text.contains(k.as_str()))
            || self.patterns.iter().any(|p| p.is_match(full_text))
    }
}

fn compile_pattern(rule: &str, pattern: &str) -> Result<Regex, PolicyError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PolicyError::InvalidPattern {
            rule: rule.to_string(),
            message: e.to_string(),
        })
}

/// Ordered-rule audience classifier built from a [`ClassifierPolicy`].
pub struct AudienceClassifier {
    rules: Vec<CompiledRule>,
    default_band: AgeBand,
    kids_band: Regex,
}

impl AudienceClassifier {
    pub fn new(policy: ClassifierPolicy) -> Result<Self, PolicyError> {
        let rules = policy
            .rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let kids_band = compile_pattern("kids_band_pattern", &policy.kids_band_pattern)?;

        Ok(Self {
            rules,
            default_band: policy.default_band,
            kids_band,
        })
    }

    /// Classify a resolved book together with the submitter's comment.
    pub fn classify(&self, metadata: &ResolvedMetadata, user_comment: &str) -> Classification {
        self.classify_text(&metadata.description, &metadata.categories, user_comment)
    }

    /// Classify from raw parts; empty inputs fall through to the default band.
    pub fn classify_text(
        &self,
        description: &str,
        categories: &[String],
        user_comment: &str,
    ) -> Classification {
        let category_text = categories.join(" ").to_lowercase();
        let full_text =
            format!("{} {} {}", description, category_text, user_comment).to_lowercase();

        let fired = self
            .rules
            .iter()
            .find(|rule| rule.matches(&category_text, &full_text));

        let (age_band, adult, matched_rule) = match fired {
            Some(rule) => (rule.band.clone(), rule.adult, Some(rule.name.clone())),
            None => (self.default_band.clone(), false, None),
        };

        let is_kids_book = !adult && self.kids_band.is_match(age_band.as_str());

        Classification {
            age_band,
            is_kids_book,
            matched_rule,
        }
    }
}

impl Default for AudienceClassifier {
    fn default() -> Self {
        Self::new(ClassifierPolicy::default()).expect("default classifier policy compiles")
    }
}
