// Multi-label classification — logit models and score extraction.
//
// LogitModel is the seam: anything that can turn text into per-class logits
// plugs into MultiLabelPipeline. OnnxClassifier is the local implementation;
// the extractor does the sigmoid/threshold/rank step on whatever comes out.

pub mod download;
pub mod extractor;
pub mod model_config;
pub mod onnx;
pub mod pipeline;
pub mod traits;
