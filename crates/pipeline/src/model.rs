//! Persisted classifier artifact
//!
//! A fitted binary logistic regression: schema, per-feature
//! standardization statistics, weights, and intercept, serialized as
//! JSON. Created once by training, immutable afterwards, consumed only
//! by evaluation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use voyage_core::{FeatureSchema, PipelineError, Result};

/// Per-feature mean and standard deviation captured at training time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standardization {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Standardization {
    pub fn apply(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&x, (&mean, &sd))| (x - mean) / sd)
            .collect()
    }
}

/// Model provenance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub created_at: i64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub n_samples: usize,
}

/// Fitted binary logistic regression
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub schema: FeatureSchema,
    pub standardization: Standardization,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub metadata: ModelMetadata,
}

impl LogisticModel {
    /// Linear score for one raw (unstandardized) feature row.
    pub fn decision(&self, features: &[f64]) -> f64 {
        let standardized = self.standardization.apply(features);
        let dot: f64 = self
            .weights
            .iter()
            .zip(&standardized)
            .map(|(w, x)| w * x)
            .sum();
        dot + self.intercept
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision(features))
    }

    /// Hard 0/1 prediction at the 0.5 threshold.
    pub fn predict(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba(features) > 0.5)
    }

    /// Serialize to a JSON file, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Deserialize from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ModelNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let model = serde_json::from_str(&json)?;
        Ok(model)
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
