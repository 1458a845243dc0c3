//! Shared error type.
//!
//! Sub-crates define their own error enums for their own failure modes and
//! wrap `FleetError` where a core operation (config, parsing) can fail.

use thiserror::Error;

/// The top-level error type for `fleet-core`.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `fleet-core`.
pub type FleetResult<T> = Result<T, FleetError>;
