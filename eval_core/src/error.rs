//! Fatal configuration errors, raised before any scoring begins.
//!
//! Data-level oddities (missing true futures, unclassifiable obstacles) are
//! never errors; they are counted and reported in the evaluation diagnostics
//! instead.

use thiserror::Error;

/// Configuration problems that would silently corrupt every accumulated
/// metric if allowed through.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The evaluation horizon must be a positive, finite number of seconds.
    #[error("evaluation horizon must be positive and finite, got {0}")]
    InvalidHorizon(f64),

    /// A scorer tolerance must be a positive, finite distance in meters.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
}
