//! Error types for rust_ddct

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::SeriesRole;

/// Main error type for ΔΔCt analysis
#[derive(Error, Debug)]
pub enum DdctError {
    #[error("Invalid Ct value: '{token}' is not a finite number")]
    Parse { token: String },

    #[error("No usable {role} Ct values for gene {gene}, group {group}")]
    EmptySeries {
        gene: String,
        group: String,
        role: SeriesRole,
    },

    #[error("{test} needs at least {required} samples per group, got {got}")]
    InsufficientSamples {
        test: &'static str,
        required: usize,
        got: usize,
    },

    #[error("Comparison unavailable: {reason}")]
    ComparisonUnavailable { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification of a per-pair failure, kept in the analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Parse,
    EmptySeries,
    InsufficientSamples,
    ComparisonUnavailable,
    Other,
}

impl DdctError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DdctError::Parse { .. } => FailureKind::Parse,
            DdctError::EmptySeries { .. } => FailureKind::EmptySeries,
            DdctError::InsufficientSamples { .. } => FailureKind::InsufficientSamples,
            DdctError::ComparisonUnavailable { .. } => FailureKind::ComparisonUnavailable,
            _ => FailureKind::Other,
        }
    }
}

/// Result type alias for ΔΔCt operations
pub type Result<T> = std::result::Result<T, DdctError>;
