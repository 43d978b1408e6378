//! TOML loading for [`ScoringConfig`].

use std::path::Path;

use flu_risk_scoring_models::ScoringConfig;

use crate::ScoringError;

/// Parses a scoring configuration from TOML.
///
/// # Errors
///
/// Returns [`ScoringError::Config`] if the TOML is malformed or contains
/// unknown keys.
pub fn parse_scoring_config(toml_str: &str) -> Result<ScoringConfig, ScoringError> {
    toml::de::from_str(toml_str).map_err(|e| ScoringError::Config {
        message: e.to_string(),
    })
}

/// Reads and parses a scoring configuration file.
///
/// # Errors
///
/// Returns [`ScoringError::Config`] if the file cannot be read or parsed.
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ScoringError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ScoringError::Config {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    log::info!("Loaded scoring configuration from {}", path.display());
    parse_scoring_config(&contents)
}
