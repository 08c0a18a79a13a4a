//! Flat YAML property files.
//!
//! A property file is a single YAML mapping of scalar keys to scalar
//! values. Nesting is rejected; layered resolution works on dotted keys,
//! not document structure.

use std::path::{Path, PathBuf};

use paygrid_core::ConfigurationError;
use serde_yaml::Value;

use crate::error::ConfigError;

/// Default property file location under the platform config directory.
pub fn default_properties_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paygrid").join("paygrid.yaml"))
}

/// Load a property file, preserving file order.
pub fn load_properties_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_properties(&raw, &path.display().to_string())
}

fn parse_properties(raw: &str, path: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let value: Value = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ConfigurationError(format!(
                "property file `{path}` is not a mapping"
            ))
            .into())
        }
    };

    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            other => {
                return Err(ConfigurationError(format!(
                    "property file `{path}` has a non-string key: {other:?}"
                ))
                .into())
            }
        };
        pairs.push((key.clone(), scalar_to_string(&key, &value, path)?));
    }
    Ok(pairs)
}

/// Coerce a scalar YAML value to its string form. `null` becomes the
/// empty string; structured values are configuration errors.
fn scalar_to_string(key: &str, value: &Value, path: &str) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(ConfigurationError(format!(
            "property `{key}` in `{path}` is not a scalar"
        ))
        .into()),
    }
}
