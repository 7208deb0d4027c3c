// asjc: multi-label ASJC subject classification for paper metadata.
//
// This is the library root. `classifier` holds the model seam and the score
// extractor; `config` and `output` serve the CLI.

pub mod classifier;
pub mod config;
pub mod error;
pub mod output;

pub use classifier::extractor::{
    extract, sigmoid, ClassLabelSet, MultiLabelExtractor, ScoredLabel, Threshold,
    DEFAULT_THRESHOLD,
};
pub use error::ExtractError;
