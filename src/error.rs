//! Error types for score extraction.
//!
//! Extraction itself has exactly two failure modes, both caller mistakes.
//! Everything else in the crate (model loading, downloads, config) uses
//! `anyhow::Result`, and an [`ExtractError`] converts into it with `?`.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`ExtractError`] as the error type.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The logit vector and the label set are not index-aligned.
    #[error("logit vector has {logits} entries but the label set has {labels}")]
    InvalidInput { logits: usize, labels: usize },

    /// Threshold outside [0, 1] (or NaN).
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}
