// Local ONNX classifier for the SciBERT multi-label ASJC checkpoint.
//
// Runs entirely on the local CPU. The checkpoint is a BertForSequenceClassification
// export: three i64 inputs (input_ids, attention_mask, token_type_ids) and one
// [batch, num_labels] output of raw logits. Sigmoid and thresholding happen in
// the extractor, not here.
//
// Files expected in the model directory: model.onnx, tokenizer.json, config.json.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::download::{CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE};
use super::extractor::ClassLabelSet;
use super::model_config::ModelConfig;
use super::traits::LogitModel;

/// BERT position embeddings stop at 512; longer abstracts are truncated.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Local ONNX-based multi-label classifier.
pub struct OnnxClassifier {
    // ort::Session::run takes &mut self, and spawn_blocking needs 'static,
    // hence Arc<Mutex<_>>. Calls are serialized on the session.
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    labels: ClassLabelSet,
    default_threshold: Option<f64>,
}

impl OnnxClassifier {
    /// Load the ONNX model, tokenizer and label config from `model_dir`.
    ///
    /// Run `download::download_model()` first if the files aren't there.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let config_path = model_dir.join(CONFIG_FILE);

        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                anyhow::bail!(
                    "Model file not found: {}\nRun `asjc download-model` to download it.",
                    path.display()
                );
            }
        }

        let config = ModelConfig::load(&config_path)?;
        let labels = config.label_set()?;

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        // One text per call, so no padding; truncation keeps us inside the model's window.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        debug!(
            labels = labels.len(),
            default_threshold = ?config.threshold,
            "Loaded ONNX classifier from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            labels,
            default_threshold: config.threshold,
        })
    }
}

#[async_trait]
impl LogitModel for OnnxClassifier {
    /// Tokenize, run one forward pass, and return the raw logit row.
    ///
    /// The CPU-bound work runs on spawn_blocking so it doesn't stall the
    /// tokio runtime.
    async fn logits(&self, text: &str) -> Result<Vec<f64>> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

            let seq_len = encoding.get_ids().len();
            let shape = [1_i64, seq_len as i64];

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> =
                encoding.get_type_ids().iter().map(|&t| t as i64).collect();

            let input_ids_tensor = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
                .context("Failed to create attention_mask tensor")?;
            let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
                .context("Failed to create token_type_ids tensor")?;

            let mut session = session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("ONNX inference failed")?;

            // Output shape: [1, num_labels]
            let (_out_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract output tensor")?;

            debug!(
                tokens = seq_len,
                logits = data.len(),
                "ONNX classified text"
            );

            let logits: Vec<f64> = data.iter().map(|&logit| logit as f64).collect();
            Ok(logits)
        })
        .await
        .context("spawn_blocking panicked")?
    }

    fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }

    fn default_threshold(&self) -> Option<f64> {
        self.default_threshold
    }
}
