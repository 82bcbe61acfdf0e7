//! Error types for metricgen

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Exporter setup or mode error
    #[error("Exporter error: {0}")]
    Exporter(#[from] ExporterError),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors
///
/// Every variant is fatal to startup; a partially valid configuration
/// never produces a running exporter.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the configuration file
    #[error("Failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not parse the configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Namespace missing or empty
    #[error("`namespace` must be a non-empty string")]
    EmptyNamespace,

    /// Two global modes share a name
    #[error("Duplicate mode `{0}`")]
    DuplicateMode(String),

    /// Two metrics share a name
    #[error("Duplicate metric `{0}`")]
    DuplicateMetric(String),

    /// Metric declared with a non-positive update interval
    #[error("Metric `{0}`: interval_secs must be greater than zero")]
    ZeroInterval(String),

    /// Negative jitter bound in some parameter set
    #[error("Metric `{metric}`: negative jitter_bound in {context}")]
    NegativeJitter { metric: String, context: String },

    /// A metric or instance references a mode absent from the global list
    #[error("Metric `{metric}` references undeclared mode `{mode}`")]
    UndeclaredMode { metric: String, mode: String },

    /// The listen address override could not be parsed
    #[error("Invalid listen address `{0}`")]
    InvalidListenAddr(String),
}

/// Errors from the exporter and scheduler layer
#[derive(Debug, Error)]
pub enum ExporterError {
    /// A mode was registered twice
    #[error("Duplicate mode `{0}`")]
    DuplicateMode(String),

    /// A mode-switch or mode lookup named an unregistered mode
    #[error("Unknown mode `{0}`")]
    UnknownMode(String),

    /// Registration was attempted after the scheduler started ticking
    #[error("Scheduler already started; registration is closed")]
    AlreadyStarted,

    /// Underlying metrics registry rejected a collector
    #[error("Metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );

        assert_eq!(
            ApiError::Internal("test".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_mode_message_names_the_mode() {
        let err = ExporterError::UnknownMode("surge".to_string());
        assert!(err.to_string().contains("surge"));
    }
}
