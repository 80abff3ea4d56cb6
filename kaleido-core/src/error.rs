//! Error types for Kaleido operations
//!
//! Every fallible operation in the engine returns [`KaleidoError`]. Each
//! variant carries:
//! - A human-readable message
//! - A stable error code for programmatic handling
//! - A category for grouping
//!
//! Closure budget overruns are *not* errors: a truncated group is reported
//! through [`CoxeterGroup::is_limit_over`](crate::coxeter::CoxeterGroup::is_limit_over)
//! and every downstream stage keeps working on the truncated element set.
//!
//! # Example
//!
//! ```rust
//! use kaleido_core::error::{KaleidoError, ErrorCategory};
//!
//! fn handle_error(err: KaleidoError) {
//!     match err.category() {
//!         ErrorCategory::Validation => println!("Fix the input: {}", err.error_code()),
//!         ErrorCategory::Geometry => println!("No embedding for this matrix"),
//!         _ => println!("Other error"),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Kaleido operations
pub type Result<T> = std::result::Result<T, KaleidoError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input rejected before any computation
    Validation,
    /// Input is well formed but has no geometric realization
    Geometry,
    /// A computation needed an exact group and only got a truncated one
    Limit,
    /// Broken internal invariant
    Internal,
}

/// Errors that can occur in Kaleido operations
#[derive(Error, Debug)]
pub enum KaleidoError {
    // ═══════════════════════════════════════════════════════════════════════
    // Matrix and input validation
    // ═══════════════════════════════════════════════════════════════════════

    /// Rank outside the range a component supports
    #[error("Unsupported rank {rank}: expected {expected}")]
    InvalidRank { rank: usize, expected: String },

    /// Bond label that the closure engine cannot enumerate
    #[error("Invalid bond label {label} between mirrors {a} and {b}: {reason}")]
    InvalidBond {
        a: usize,
        b: usize,
        label: String,
        reason: String,
    },

    /// Lower-triangle length does not match the rank
    #[error("Coxeter matrix of rank {rank} needs {expected} bond labels, got {actual}")]
    MatrixSize {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    /// Text could not be parsed as a rational number
    #[error("Cannot parse '{input}' as a rational number")]
    ParseRational { input: String },

    /// Selector id is not in the registry
    #[error("Unknown selector '{id}'. Known selectors: {known}")]
    UnknownSelector { id: String, known: String },

    /// Generator tuple has the wrong length for the selector
    #[error("Selector needs {expected} generators, got {actual}")]
    GeneratorCount { expected: usize, actual: usize },

    /// Word uses letters outside the group or leaves the enumerated set
    #[error("Word '{word}' does not name an element of this group")]
    UnknownWord { word: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Geometry
    // ═══════════════════════════════════════════════════════════════════════

    /// Bond angles admit no embedding as unit mirror normals
    #[error("No valid embedding: pivot {pivot} of the mirror Gram matrix is {value}")]
    NoEmbedding { pivot: usize, value: f64 },

    // ═══════════════════════════════════════════════════════════════════════
    // Limits and invariants
    // ═══════════════════════════════════════════════════════════════════════

    /// Operation requires a closed group but the closure was truncated
    #[error("Group closure stopped at {order} elements before finishing")]
    LimitExceeded { order: usize },

    /// Traced topology violates a closure or uniqueness invariant
    #[error("Topology invariant violated: {reason}")]
    TopologyInvariant { reason: String },

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl KaleidoError {
    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            KaleidoError::InvalidRank { .. }
            | KaleidoError::InvalidBond { .. }
            | KaleidoError::MatrixSize { .. }
            | KaleidoError::ParseRational { .. }
            | KaleidoError::UnknownSelector { .. }
            | KaleidoError::GeneratorCount { .. }
            | KaleidoError::UnknownWord { .. }
            | KaleidoError::Config { .. }
            | KaleidoError::JsonError(_) => ErrorCategory::Validation,

            KaleidoError::NoEmbedding { .. } => ErrorCategory::Geometry,

            KaleidoError::LimitExceeded { .. } => ErrorCategory::Limit,

            KaleidoError::TopologyInvariant { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the stable error code for this error
    ///
    /// Error codes are uppercase, underscore-separated identifiers that
    /// remain stable across versions.
    pub fn error_code(&self) -> &'static str {
        match self {
            KaleidoError::InvalidRank { .. } => "INVALID_RANK",
            KaleidoError::InvalidBond { .. } => "INVALID_BOND",
            KaleidoError::MatrixSize { .. } => "MATRIX_SIZE",
            KaleidoError::ParseRational { .. } => "PARSE_RATIONAL",
            KaleidoError::UnknownSelector { .. } => "UNKNOWN_SELECTOR",
            KaleidoError::GeneratorCount { .. } => "GENERATOR_COUNT",
            KaleidoError::UnknownWord { .. } => "UNKNOWN_WORD",
            KaleidoError::Config { .. } => "CONFIG_ERROR",
            KaleidoError::NoEmbedding { .. } => "NO_EMBEDDING",
            KaleidoError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            KaleidoError::TopologyInvariant { .. } => "TOPOLOGY_INVARIANT",
            KaleidoError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// Returns true if the caller should fix the input rather than retry
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Validation | ErrorCategory::Geometry
        )
    }

    /// Converts this error to a JSON-serializable response object
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
            },
        }
    }
}

/// JSON error envelope used by the CLI and the WASM bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
}
