//! Classifier configuration adapters
//!
//! Thin wrappers that pin a generic image classifier to one architecture
//! and supply its default training options. Model construction, training
//! and inference live in the generic base behind [`TorchvisionClassifier`].

pub mod options;
mod squeezenet;

use serde_json::Value;
use thiserror::Error;

pub use squeezenet::{SqueezeNet, SQUEEZENET_FLAVOR, SQUEEZENET_MODEL_DEF, SQUEEZENET_OPTIONS_FILE};

/// The generic classifier an adapter delegates to
pub trait TorchvisionClassifier {
    /// Fully resolved model configuration (`MODEL.TVCLASSIFIER.FLAVOR`, ...)
    fn model_config(&self) -> &Value;
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("{actual} != \"{expected}\"")]
    FlavorMismatch {
        actual: String,
        expected: &'static str,
    },

    #[error("invalid model options: {0}")]
    InvalidOptions(String),

    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse options file: {0}")]
    Json(#[from] serde_json::Error),
}
