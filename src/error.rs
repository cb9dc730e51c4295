/// Error types for rule evaluation and configuration loading.
///
/// `ComparisonError` never leaves the classifier: every variant degrades to
/// "this rule does not match". `ConfigError` is the only error a caller sees,
/// and only when loading or validating configuration.

use crate::model::Operator;
use std::path::PathBuf;

/// Why a single rule could not be evaluated against an observed value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComparisonError {
    #[error("unrecognized operator")]
    UnknownOperator,

    #[error("malformed threshold for {operator}: {threshold:?}")]
    MalformedThreshold { operator: Operator, threshold: String },

    #[error("observed value {observed:?} is not numeric")]
    NonNumericObserved { observed: String },

    #[error("no observed value")]
    MissingObserved,
}

/// Errors raised while loading rule catalogs or validating sensor limits.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported rule catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("duplicate rule set id: {0}")]
    DuplicateRuleSet(String),

    #[error("invalid limits for sensor {sensor_id}: min {min} is greater than max {max}")]
    InvalidLimits { sensor_id: String, min: f64, max: f64 },
}
