//! Default option loading shared by classifier adapters

use serde_json::{json, Map, Value};
use std::path::Path;

use super::ClassifierError;
use crate::logger;

/// Built-in defaults for torchvision-backed classifiers
pub fn torchvision_defaults() -> Value {
    json!({
        "defs": {
            "model": "labels/resnet18_ImageNet.yaml"
        },
        "options": {
            "general": {
                "device": "cpu",
                "seed": 0
            },
            "train": {
                "batch_size": 8,
                "epochs": 1
            },
            "inference": {
                "batch_size": 8
            }
        }
    })
}

/// Load `options_file` and merge it over `builtin`
///
/// A missing or malformed file leaves the built-in defaults in place.
pub fn load_default_options(options_file: &Path, builtin: &Value) -> Value {
    let mut options = builtin.clone();
    match read_json(options_file) {
        Ok(overrides) => merge(&mut options, overrides),
        Err(e) => logger::log_warning(&format!(
            "Could not load model options from '{}' ({e}), using built-in defaults",
            options_file.display()
        )),
    }
    options
}

fn read_json(path: &Path) -> Result<Value, ClassifierError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Recursively merge `overrides` into `base`; objects merge, anything else replaces
pub fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Set `options[section][key]`, creating `section` when absent
pub fn set_option(
    options: &mut Value,
    section: &str,
    key: &str,
    value: Value,
) -> Result<(), ClassifierError> {
    let root = options
        .as_object_mut()
        .ok_or_else(|| ClassifierError::InvalidOptions("options are not a JSON object".into()))?;
    let section_value = root
        .entry(section)
        .or_insert_with(|| Value::Object(Map::new()));
    let section_map = section_value.as_object_mut().ok_or_else(|| {
        ClassifierError::InvalidOptions(format!("'{section}' is not a JSON object"))
    })?;
    section_map.insert(key.to_string(), value);
    Ok(())
}
