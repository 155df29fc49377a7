//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or missing configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no counting line configured for sequence `{0}`")]
    UnknownSequence(String),

    #[error("failed to read config file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Reasons a detection is rejected before association.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DetectionError {
    #[error("detection has non-finite coordinates or confidence")]
    NonFinite,

    #[error("detection box is inverted or empty")]
    Inverted,

    #[error("detection confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}

/// Numeric failure inside the motion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("innovation covariance could not be inverted")]
    SingularInnovation,

    #[error("non-finite state after {stage}")]
    NonFinite { stage: &'static str },
}

/// Failures reading or writing MOT-format text records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}
