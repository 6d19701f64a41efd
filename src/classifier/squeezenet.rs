//! SqueezeNet 1.0 adapter over the generic torchvision classifier

use serde_json::Value;
use std::path::Path;

use super::options::{load_default_options, set_option};
use super::{ClassifierError, TorchvisionClassifier};

pub const SQUEEZENET_FLAVOR: &str = "squeezenet1_0";
pub const SQUEEZENET_OPTIONS_FILE: &str = "config/ai/model/detectron2/labels/squeezenet.json";
pub const SQUEEZENET_MODEL_DEF: &str = "labels/squeezenet1_0_ImageNet.yaml";

/// Pointer to the flavor flag inside the resolved model configuration
const FLAVOR_POINTER: &str = "/MODEL/TVCLASSIFIER/FLAVOR";

/// A torchvision classifier known to be configured as SqueezeNet 1.0
#[derive(Debug)]
pub struct SqueezeNet<B> {
    base: B,
}

impl<B: TorchvisionClassifier> SqueezeNet<B> {
    /// Wrap an already constructed base model, checking its flavor
    pub fn new(base: B) -> Result<Self, ClassifierError> {
        let flavor = base
            .model_config()
            .pointer(FLAVOR_POINTER)
            .and_then(Value::as_str)
            .unwrap_or("<unset>");
        if flavor != SQUEEZENET_FLAVOR {
            return Err(ClassifierError::FlavorMismatch {
                actual: flavor.to_string(),
                expected: SQUEEZENET_FLAVOR,
            });
        }
        Ok(Self { base })
    }

    pub const fn base(&self) -> &B {
        &self.base
    }
}

impl<B> SqueezeNet<B> {
    /// Default options: `options_file` merged over `builtin`, pointing at
    /// the SqueezeNet model definition
    pub fn default_options(options_file: &Path, builtin: &Value) -> Result<Value, ClassifierError> {
        let mut options = load_default_options(options_file, builtin);
        set_option(
            &mut options,
            "defs",
            "model",
            Value::String(SQUEEZENET_MODEL_DEF.to_string()),
        )?;
        Ok(options)
    }
}
