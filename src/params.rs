use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Flag(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

pub trait ParameterProvider {
    fn scalar(&self, section: &str, key: &str) -> Option<ParamValue>;
}

/// In-memory parameters, loadable from JSON shaped as
/// `{ "Section": { "Key": value } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    sections: HashMap<String, HashMap<String, ParamValue>>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Source(e.to_string()))
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Source(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<ParamValue>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn with(mut self, section: &str, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(section, key, value);
        self
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<ParamValue> {
        self.sections.get_mut(section)?.remove(key)
    }
}

impl ParameterProvider for ParameterSet {
    fn scalar(&self, section: &str, key: &str) -> Option<ParamValue> {
        self.sections.get(section)?.get(key).cloned()
    }
}
