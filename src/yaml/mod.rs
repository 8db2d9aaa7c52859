//! YAML file reading and writing with source-aware diagnostics

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlParseError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Parse a YAML file, reporting syntax errors against the file contents
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml_str(&content, &path.display().to_string())
}

/// Parse YAML text; `filename` labels the diagnostic
pub fn parse_yaml_str<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlParseError::new(&e, content, filename).into())
}

/// Serialize a value and write it to `path`, creating parent directories
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let yaml = serde_yml::to_string(value).map_err(|e| YamlError::Serialize(e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, yaml)?;
    Ok(())
}
