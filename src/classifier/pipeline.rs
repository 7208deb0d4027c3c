// Multi-label pipeline — a logit model composed with an extractor.
//
// The threshold is resolved once here, when the pipeline is built, and never
// changes afterwards: explicit override, then the model's config default,
// then DEFAULT_THRESHOLD.

use anyhow::Result;
use tracing::debug;

use super::extractor::{ClassLabelSet, MultiLabelExtractor, ScoredLabel, Threshold};
use super::traits::LogitModel;

pub struct MultiLabelPipeline {
    model: Box<dyn LogitModel>,
    extractor: MultiLabelExtractor,
}

impl MultiLabelPipeline {
    /// Build a pipeline around `model`. Fails with `ExtractError::InvalidThreshold`
    /// if the resolved threshold is outside [0, 1].
    pub fn new(model: Box<dyn LogitModel>, explicit_threshold: Option<f64>) -> Result<Self> {
        let threshold = Threshold::resolve(explicit_threshold, model.default_threshold())?;
        let extractor = MultiLabelExtractor::new(model.labels().clone(), threshold);

        debug!(
            labels = extractor.labels().len(),
            threshold = threshold.value(),
            explicit = explicit_threshold.is_some(),
            "Built multi-label pipeline"
        );

        Ok(Self { model, extractor })
    }

    pub fn threshold(&self) -> Threshold {
        self.extractor.threshold()
    }

    pub fn labels(&self) -> &ClassLabelSet {
        self.extractor.labels()
    }

    /// Classify one text. Model errors are passed through untouched; a logit
    /// vector of the wrong width comes back as `ExtractError::InvalidInput`.
    pub async fn classify(&self, text: &str) -> Result<Vec<ScoredLabel>> {
        let logits = self.model.logits(text).await?;
        let predictions = self.extractor.extract(&logits)?;

        debug!(
            kept = predictions.len(),
            top = predictions.first().map(|p| p.label.as_str()),
            "Extracted labels"
        );

        Ok(predictions)
    }
}
