//! Error types for netaudit.
//!
//! The taxonomy separates fatal, pre-run failures (configuration, parsing,
//! validation, topology discovery) from failures the engine contains at
//! smaller scopes during a run. Anything below whole-run granularity is
//! handled inside the engine and never surfaces as an `AuditError`.

use thiserror::Error;

/// Library-level errors.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration error (environment variables, settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playbook parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Playbook validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Topology or authentication discovery failed before the run started
    #[error("Connection error: {0}")]
    Connection(String),

    /// The dashboard rejected the API key
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A dashboard API call failed
    #[error("API error: {0}")]
    Api(String),

    /// Report directory or file write failed
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AuditError.
pub type AuditResult<T> = Result<T, AuditError>;

impl From<envy::Error> for AuditError {
    fn from(err: envy::Error) -> Self {
        AuditError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for AuditError {
    fn from(err: serde_yaml::Error) -> Self {
        AuditError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        AuditError::Api(err.to_string())
    }
}

impl From<csv::Error> for AuditError {
    fn from(err: csv::Error) -> Self {
        AuditError::Report(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = AuditError::Validation("missing operation name".to_string());
        assert_eq!(err.to_string(), "Validation error: missing operation name");
    }

    #[test]
    fn test_auth_error_display() {
        let err = AuditError::Auth("401 Unauthorized".to_string());
        assert_eq!(err.to_string(), "Authentication error: 401 Unauthorized");
    }

    #[test]
    fn test_yaml_error_maps_to_parse() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(": : :").unwrap_err();
        let err: AuditError = yaml_err.into();
        assert!(matches!(err, AuditError::Parse(_)));
    }
}
