// Composition tests — a fixed-output LogitModel wired through
// MultiLabelPipeline, checking threshold resolution and error pass-through
// without any model files or network access.

use anyhow::Result;
use async_trait::async_trait;

use asjc::classifier::pipeline::MultiLabelPipeline;
use asjc::classifier::traits::LogitModel;
use asjc::output::{to_json, truncate_chars};
use asjc::{ClassLabelSet, ExtractError};

/// Returns the same logits for every input.
struct FixedModel {
    labels: ClassLabelSet,
    logits: Vec<f64>,
    default_threshold: Option<f64>,
}

impl FixedModel {
    fn new(labels: &[&str], logits: &[f64]) -> Self {
        Self {
            labels: ClassLabelSet::new(labels.iter().copied()),
            logits: logits.to_vec(),
            default_threshold: None,
        }
    }

    fn with_default(mut self, threshold: f64) -> Self {
        self.default_threshold = Some(threshold);
        self
    }
}

#[async_trait]
impl LogitModel for FixedModel {
    async fn logits(&self, _text: &str) -> Result<Vec<f64>> {
        Ok(self.logits.clone())
    }

    fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }

    fn default_threshold(&self) -> Option<f64> {
        self.default_threshold
    }
}

/// Always fails, like an unreachable or broken model.
struct FailingModel {
    labels: ClassLabelSet,
}

#[async_trait]
impl LogitModel for FailingModel {
    async fn logits(&self, _text: &str) -> Result<Vec<f64>> {
        anyhow::bail!("model backend unavailable")
    }

    fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }
}

// ============================================================
// Chain: LogitModel -> MultiLabelPipeline -> ScoredLabel
// ============================================================

#[tokio::test]
async fn pipeline_classifies_with_default_threshold() {
    let model = FixedModel::new(&["A", "B", "C"], &[2.0, -2.0, 0.0]);
    let pipeline = MultiLabelPipeline::new(Box::new(model), None).unwrap();

    assert_eq!(pipeline.threshold().value(), 0.3);
    assert_eq!(pipeline.labels().len(), 3);

    let out = pipeline.classify("any text").await.unwrap();
    let names: Vec<&str> = out.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[tokio::test]
async fn model_default_threshold_applies_without_override() {
    // sigmoid(0) = 0.5 falls below a 0.6 model default
    let model = FixedModel::new(&["A", "B", "C"], &[2.0, -2.0, 0.0]).with_default(0.6);
    let pipeline = MultiLabelPipeline::new(Box::new(model), None).unwrap();

    assert_eq!(pipeline.threshold().value(), 0.6);
    let out = pipeline.classify("any text").await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].label, "A");
}

#[tokio::test]
async fn explicit_threshold_overrides_model_default() {
    let model = FixedModel::new(&["A", "B", "C"], &[2.0, -2.0, 0.0]).with_default(0.6);
    let pipeline = MultiLabelPipeline::new(Box::new(model), Some(0.1)).unwrap();

    assert_eq!(pipeline.threshold().value(), 0.1);
    let out = pipeline.classify("any text").await.unwrap();
    assert_eq!(out.len(), 3);
}

#[test]
fn invalid_threshold_rejected_at_construction() {
    let model = FixedModel::new(&["A"], &[0.0]);
    let err = match MultiLabelPipeline::new(Box::new(model), Some(2.0)) {
        Ok(_) => panic!("threshold 2.0 should be rejected"),
        Err(e) => e,
    };
    assert_eq!(
        err.downcast_ref::<ExtractError>(),
        Some(&ExtractError::InvalidThreshold(2.0))
    );
}

#[tokio::test]
async fn wrong_logit_width_surfaces_invalid_input() {
    let model = FixedModel::new(&["A", "B", "C"], &[1.0, 2.0]);
    let pipeline = MultiLabelPipeline::new(Box::new(model), None).unwrap();

    let err = pipeline.classify("any text").await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ExtractError>(),
        Some(&ExtractError::InvalidInput {
            logits: 2,
            labels: 3
        })
    );
}

#[tokio::test]
async fn model_errors_pass_through_unmodified() {
    let model = FailingModel {
        labels: ClassLabelSet::new(["A"]),
    };
    let pipeline = MultiLabelPipeline::new(Box::new(model), None).unwrap();

    let err = pipeline.classify("any text").await.unwrap_err();
    assert_eq!(err.to_string(), "model backend unavailable");
    assert!(err.downcast_ref::<ExtractError>().is_none());
}

#[tokio::test]
async fn concurrent_classify_calls_agree() {
    let model = FixedModel::new(&["A", "B", "C"], &[2.0, -2.0, 0.0]);
    let pipeline = std::sync::Arc::new(MultiLabelPipeline::new(Box::new(model), None).unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = std::sync::Arc::clone(&pipeline);
            tokio::spawn(async move { pipeline.classify(&format!("text {i}")).await.unwrap() })
        })
        .collect();

    let first = pipeline.classify("reference").await.unwrap();
    for task in tasks {
        assert_eq!(task.await.unwrap(), first);
    }
}

// ============================================================
// Chain: ScoredLabel -> output
// ============================================================

#[tokio::test]
async fn predictions_serialize_as_label_score_objects() {
    let model = FixedModel::new(&["Pharmacology", "Pharmacology (medical)"], &[2.0, 4.0]);
    let pipeline = MultiLabelPipeline::new(Box::new(model), None).unwrap();
    let out = pipeline.classify("any text").await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&to_json(&out).unwrap()).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["label"], "Pharmacology (medical)");
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
    assert_eq!(arr[1]["label"], "Pharmacology");
}

#[test]
fn empty_predictions_serialize_as_empty_array() {
    assert_eq!(to_json(&[]).unwrap(), "[]");
}

#[test]
fn truncate_chars_respects_multibyte_characters() {
    let text = "β-lactams β-lactams";
    assert_eq!(truncate_chars(text, 3), "β-l...");
    assert_eq!(truncate_chars(text, 100), text);
}
