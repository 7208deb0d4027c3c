// Logit model trait — the narrow seam between inference and extraction.
//
// A model only has to turn text into raw per-class logits and say which
// labels those logits belong to. Tokenization, weights, and runtime details
// stay behind this trait, so the extractor never sees them and tests can
// plug in a fixed-output model.

use anyhow::Result;
use async_trait::async_trait;

use super::extractor::ClassLabelSet;

/// A multi-label classifier that produces one raw logit per class.
///
/// Implementations must be async because inference is CPU-bound and should
/// be offloaded from the runtime (or may sit behind a network call).
#[async_trait]
pub trait LogitModel: Send + Sync {
    /// Run inference on one text. The returned vector should be index-aligned
    /// with [`LogitModel::labels`]; a length mismatch is reported by the
    /// extractor, not here.
    async fn logits(&self, text: &str) -> Result<Vec<f64>>;

    /// The model-owned label set, fixed at load time.
    fn labels(&self) -> &ClassLabelSet;

    /// Default threshold from the model's config, if it ships one.
    fn default_threshold(&self) -> Option<f64> {
        None
    }
}
