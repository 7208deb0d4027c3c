// HuggingFace config.json — the parts the classifier needs.
//
// Only two keys matter here: `id2label`, which names each output logit, and
// an optional top-level `threshold` that the checkpoint author can set as a
// default. Every other key in the file is ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::extractor::ClassLabelSet;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
    /// Default threshold shipped with the checkpoint, if any.
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse model config.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Turn `id2label` into a label set ordered by class index.
    ///
    /// The keys must be exactly "0".."N-1". Gaps, duplicates after parsing
    /// (e.g. "1" and "01"), or non-numeric keys are rejected rather than
    /// silently shifting labels onto the wrong logits.
    pub fn label_set(&self) -> Result<ClassLabelSet> {
        if self.id2label.is_empty() {
            anyhow::bail!("Model config has no id2label mapping");
        }

        let mut slots: Vec<Option<&str>> = vec![None; self.id2label.len()];
        for (key, label) in &self.id2label {
            let index: usize = key
                .trim()
                .parse()
                .with_context(|| format!("id2label key {key:?} is not a class index"))?;
            let slot = slots.get_mut(index).with_context(|| {
                format!(
                    "id2label index {index} is out of range for {} labels",
                    self.id2label.len()
                )
            })?;
            if slot.is_some() {
                anyhow::bail!("id2label index {index} appears more than once");
            }
            *slot = Some(label.as_str());
        }

        // Every slot is filled: N distinct indices, all below N.
        Ok(ClassLabelSet::new(slots.into_iter().flatten()))
    }
}
