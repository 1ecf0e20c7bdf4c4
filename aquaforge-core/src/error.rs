use std::fmt;
use thiserror::Error;

/// Why a batch cannot accept a new observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    Missing,
    Closed,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Missing => f.write_str("does not exist"),
            UnavailableReason::Closed => f.write_str("is closed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AquaforgeError {
    #[error("Invalid pond dimension '{name}': {value} (must be a positive finite number)")]
    InvalidDimension { name: String, value: f64 },

    #[error("Batch '{batch_id}' {reason}")]
    BatchUnavailable {
        batch_id: String,
        reason: UnavailableReason,
    },

    #[error("Batch '{batch_id}' changed since it was read (expected version {expected}, found {actual})")]
    VersionConflict {
        batch_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Population update {before} -> {after} does not apply to batch '{batch_id}' at population {current}")]
    InvalidPopulationUpdate {
        batch_id: String,
        current: u64,
        before: u64,
        after: u64,
    },

    #[error("Invalid measurement for '{field}': {value}")]
    InvalidMeasurement { field: String, value: f64 },

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Pond '{0}' not found")]
    PondNotFound(String),

    #[error("Batch '{0}' is already registered")]
    DuplicateBatch(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to serialize JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to write CSV log '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

impl AquaforgeError {
    pub(crate) fn unavailable(batch_id: &str, reason: UnavailableReason) -> Self {
        AquaforgeError::BatchUnavailable {
            batch_id: batch_id.to_string(),
            reason,
        }
    }

    pub(crate) fn measurement(field: &str, value: f64) -> Self {
        AquaforgeError::InvalidMeasurement {
            field: field.to_string(),
            value,
        }
    }
}
