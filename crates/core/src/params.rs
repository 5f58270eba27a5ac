//! YAML parameter loading
//!
//! The shared `params.yaml` maps stage names to stage-specific options.
//! The loader returns the full document; each stage scopes itself to its
//! own namespace and surfaces missing required keys at the point of use.
//! Unknown keys are ignored.

use std::path::Path;

use crate::errors::{PipelineError, Result};

/// The full parameter document
#[derive(Clone, Debug)]
pub struct Params {
    doc: serde_yaml::Value,
}

impl Params {
    /// Load the document from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::error!("Parameter file not found: {}", path.display());
            return Err(PipelineError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| {
            tracing::error!("Failed to read parameter file {}: {source}", path.display());
            PipelineError::ConfigLoad {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let doc: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|err| {
            tracing::error!("Failed to parse parameter file {}: {err}", path.display());
            err
        })?;
        tracing::debug!("Parameters loaded from {}", path.display());
        Ok(Self { doc })
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.doc.get(name).is_some()
    }

    /// Scope to one stage's options. The namespace itself may be absent;
    /// lookups then fail only for required keys.
    pub fn namespace<'a>(&'a self, name: &str) -> Namespace<'a> {
        Namespace {
            name: name.to_string(),
            value: self.doc.get(name),
        }
    }
}

/// One stage's options within the parameter document
pub struct Namespace<'a> {
    name: String,
    value: Option<&'a serde_yaml::Value>,
}

impl Namespace<'_> {
    fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.value.and_then(|v| v.get(key))
    }

    fn missing(&self, key: &str) -> PipelineError {
        PipelineError::MissingParam {
            namespace: self.name.clone(),
            key: key.to_string(),
        }
    }

    fn invalid(&self, key: &str, expected: &'static str) -> PipelineError {
        PipelineError::InvalidParam {
            namespace: self.name.clone(),
            key: key.to_string(),
            expected,
        }
    }

    /// Required float.
    pub fn f64(&self, key: &str) -> Result<f64> {
        let value = self.get(key).ok_or_else(|| self.missing(key))?;
        value.as_f64().ok_or_else(|| self.invalid(key, "a float"))
    }

    /// Optional float with an explicit default.
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_f64().ok_or_else(|| self.invalid(key, "a float")),
        }
    }

    /// Required positive integer.
    pub fn usize(&self, key: &str) -> Result<usize> {
        let value = self.get(key).ok_or_else(|| self.missing(key))?;
        let n = value
            .as_u64()
            .ok_or_else(|| self.invalid(key, "a positive integer"))?;
        if n == 0 {
            return Err(self.invalid(key, "a positive integer"));
        }
        Ok(n as usize)
    }
}
