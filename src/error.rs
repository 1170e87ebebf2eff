//! Error handling
//!
//! Two failure classes exist in the core: malformed input (rejected by the
//! preprocessor, degraded to an ERROR report at the pipeline boundary) and
//! invalid configuration (rejected eagerly at construction/update time).

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Malformed, missing or mistyped telemetry input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("input must be a JSON object")]
    NotAnObject,

    #[error("at least one telemetry field required: voltage, frequency, power_flow")]
    NoTelemetryFields,

    #[error("{field} must be numeric")]
    NonNumericField { field: &'static str },

    #[error("breaker status must be 'ON' or 'OFF', got '{got}'")]
    InvalidBreakerStatus { got: String },

    #[error("timestamp must be a string")]
    NonStringTimestamp,
}

/// Invalid engine configuration. Fatal to the construction or update that
/// produced it; the engine keeps its last valid configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fusion weights must sum to 1.0, got {sum:.3}")]
    WeightSum { sum: f64 },

    #[error("fusion weight '{name}' must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("decision thresholds must be ordered safe < warning, got {safe} >= {warning}")]
    ThresholdOrder { safe: f64, warning: f64 },
}

/// Top-level error type for callers that handle both classes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
