use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classifier::download;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Directory containing model.onnx, tokenizer.json and config.json
    pub model_dir: PathBuf,
    /// HuggingFace repo to download the classifier from
    pub model_repo: String,
    /// Explicit threshold override (ASJC_THRESHOLD). A `--threshold` flag wins over this.
    pub threshold: Option<f64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the threshold, which falls through to
    /// the model's config and then 0.3 when unset.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("ASJC_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        let threshold = match env::var("ASJC_THRESHOLD") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<f64>()
                    .with_context(|| format!("ASJC_THRESHOLD is not a number: {raw:?}"))?,
            ),
            _ => None,
        };

        Ok(Self {
            model_dir,
            model_repo: env::var("ASJC_MODEL_REPO")
                .unwrap_or_else(|_| download::DEFAULT_MODEL_REPO.to_string()),
            threshold,
        })
    }

    /// Threshold override to hand to the pipeline: CLI flag first, then env.
    pub fn threshold_override(&self, cli: Option<f64>) -> Option<f64> {
        cli.or(self.threshold)
    }

    /// Check that the model files are present.
    /// Call this before loading the classifier.
    pub fn require_model(&self) -> Result<()> {
        if !download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Model files not found in {}\n\
                 Run `asjc download-model` to download them,\n\
                 or set ASJC_MODEL_DIR to a directory that has them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}
