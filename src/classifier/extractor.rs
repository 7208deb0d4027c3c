// Multi-label score extraction — logits in, ranked labels out.
//
// Each class is an independent yes/no decision, so every logit goes through
// its own sigmoid rather than a softmax across the vector. Anything at or
// above the threshold is kept, then the survivors are ranked by probability.
//
// Everything here is pure: no I/O, no shared mutable state. A single
// MultiLabelExtractor can be shared across threads and tasks freely.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ExtractError, Result};

/// Threshold used when neither the caller nor the model config provides one.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Sigmoid activation: maps any real number to (0, 1).
///
/// `+inf` maps to 1.0, `-inf` to 0.0, and NaN stays NaN.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Ordered class labels, indexed 0..N-1 to match the model's logit output.
///
/// Backed by an `Arc<[String]>` so the model and the extractor can hold the
/// same set without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabelSet(Arc<[String]>);

impl ClassLabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label at class index `i`, if in range.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ClassLabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self(labels.into())
    }
}

/// A label that cleared the threshold, with its sigmoid probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f64,
}

/// Minimum probability for a class to be reported. Always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Validate a threshold value. NaN and anything outside [0, 1] is rejected.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ExtractError::InvalidThreshold(value))
        }
    }

    /// Pick the threshold to use: an explicit override wins, then the model
    /// config's default, then [`DEFAULT_THRESHOLD`]. Only the chosen value is
    /// validated, so a bad model default is ignored when the caller overrides it.
    pub fn resolve(explicit: Option<f64>, model_default: Option<f64>) -> Result<Self> {
        Self::new(explicit.or(model_default).unwrap_or(DEFAULT_THRESHOLD))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert one logit vector into the labels whose probability is at least
/// `threshold`, highest first.
///
/// Labels with equal probability keep their original index order. The
/// result may be empty. Fails with [`ExtractError::InvalidInput`] when
/// `logits` and `labels` differ in length.
pub fn extract<S: AsRef<str>>(
    logits: &[f64],
    labels: &[S],
    threshold: Threshold,
) -> Result<Vec<ScoredLabel>> {
    if logits.len() != labels.len() {
        return Err(ExtractError::InvalidInput {
            logits: logits.len(),
            labels: labels.len(),
        });
    }

    let mut results: Vec<ScoredLabel> = logits
        .iter()
        .zip(labels)
        .filter_map(|(&logit, label)| {
            let score = sigmoid(logit);
            // NaN fails this comparison and is dropped
            (score >= threshold.value()).then(|| ScoredLabel {
                label: label.as_ref().to_string(),
                score,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in index order. No NaN survives the filter.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(results)
}

/// An extractor bound to one label set and one threshold for its lifetime.
#[derive(Debug, Clone)]
pub struct MultiLabelExtractor {
    labels: ClassLabelSet,
    threshold: Threshold,
}

impl MultiLabelExtractor {
    pub fn new(labels: ClassLabelSet, threshold: Threshold) -> Self {
        Self { labels, threshold }
    }

    pub fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Rank one logit vector against the held label set.
    pub fn extract(&self, logits: &[f64]) -> Result<Vec<ScoredLabel>> {
        extract(logits, self.labels.as_slice(), self.threshold)
    }
}
