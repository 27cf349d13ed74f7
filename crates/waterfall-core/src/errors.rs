//! Error types for grid style configuration.

use thiserror::Error;

/// Errors from validating a grid style built from data.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("Column count for {orientation} must be at least 1")]
    ZeroColumns { orientation: &'static str },

    #[error("Spacing must be a finite non-negative number, found {value}")]
    InvalidSpacing { value: f64 },

    #[error("Padding on the {edge} edge must be a finite non-negative number, found {value}")]
    InvalidPadding { edge: &'static str, value: f64 },

    #[cfg(feature = "serde")]
    #[error("Malformed grid style: {0}")]
    Json(#[from] serde_json::Error),
}
