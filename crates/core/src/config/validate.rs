use super::{types::Config, ConfigError, MIN_DEBOUNCE_MS};
use crate::classifier::AudienceClassifier;
use crate::quality::QualityGate;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Suggestion debounce respects the minimum quiescence window
/// - Quality thresholds are ordered and the deny-list compiles
/// - Classifier rules compile
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.suggestions.debounce_ms < MIN_DEBOUNCE_MS {
        return Err(ConfigError::ValidationError(format!(
            "suggestions.debounce_ms must be at least {}",
            MIN_DEBOUNCE_MS
        )));
    }

    if config.suggestions.max_results == 0 {
        return Err(ConfigError::ValidationError(
            "suggestions.max_results cannot be 0".to_string(),
        ));
    }

    if config.quality.min_length > config.quality.short_length {
        return Err(ConfigError::ValidationError(
            "quality.min_length cannot exceed quality.short_length".to_string(),
        ));
    }

    QualityGate::new(config.quality.clone())
        .map_err(|e| ConfigError::ValidationError(format!("quality: {}", e)))?;
    AudienceClassifier::new(config.classifier.clone())
        .map_err(|e| ConfigError::ValidationError(format!("classifier: {}", e)))?;

    Ok(())
}
