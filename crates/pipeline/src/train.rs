//! Model training stage
//!
//! Fits a binary logistic regression on the engineered training split by
//! full-batch gradient descent over standardized features. Weights start
//! at zero and the iteration order is fixed, so two runs over the same
//! data produce bit-identical models without any RNG.

use std::path::Path;

use tracing::{debug, error, info};

use voyage_core::{DataLayout, FeatureSchema, Frame, Params, PipelineError, Result};

use crate::model::{sigmoid, LogisticModel, ModelMetadata, Standardization};

/// Optimizer settings
#[derive(Clone, Debug)]
pub struct TrainingOptions {
    /// Number of full-batch epochs.
    pub max_iter: usize,
    /// Step size for the averaged gradient.
    pub learning_rate: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            learning_rate: 0.1,
        }
    }
}

/// Fit a logistic regression to the frame under the given schema.
pub fn fit(frame: &Frame, schema: &FeatureSchema, options: &TrainingOptions) -> Result<LogisticModel> {
    if let Some(column) = schema.first_missing(frame) {
        return Err(PipelineError::TrainingValue(format!(
            "column `{column}` absent from training data"
        )));
    }
    let rows = schema
        .feature_rows(frame)
        .map_err(PipelineError::TrainingValue)?;
    let labels = schema.labels(frame).map_err(PipelineError::TrainingValue)?;
    if rows.is_empty() {
        return Err(PipelineError::TrainingValue(
            "training data has no rows".to_string(),
        ));
    }
    for &label in &labels {
        if label != 0.0 && label != 1.0 {
            return Err(PipelineError::TrainingValue(format!(
                "label column `{}` must be binary 0/1, found {label}",
                schema.label
            )));
        }
    }
    if options.max_iter == 0 {
        return Err(PipelineError::TrainingValue(
            "max_iter must be positive".to_string(),
        ));
    }

    let n_samples = rows.len();
    let n_features = schema.features.len();
    let standardization = standardize_stats(&rows, n_features);
    let standardized: Vec<Vec<f64>> = rows.iter().map(|row| standardization.apply(row)).collect();

    debug!(
        "Fitting logistic regression: {n_samples} samples, {n_features} features, {} epochs",
        options.max_iter
    );

    let mut weights = vec![0.0f64; n_features];
    let mut intercept = 0.0f64;
    let scale = options.learning_rate / n_samples as f64;

    for _ in 0..options.max_iter {
        let mut grad_w = vec![0.0f64; n_features];
        let mut grad_b = 0.0f64;
        for (row, &label) in standardized.iter().zip(&labels) {
            let linear: f64 = weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + intercept;
            let residual = sigmoid(linear) - label;
            for (g, &x) in grad_w.iter_mut().zip(row) {
                *g += residual * x;
            }
            grad_b += residual;
        }
        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= scale * g;
        }
        intercept -= scale * grad_b;
    }

    if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
        return Err(PipelineError::Training(
            "optimizer diverged: non-finite weights".to_string(),
        ));
    }

    Ok(LogisticModel {
        schema: schema.clone(),
        standardization,
        weights,
        intercept,
        metadata: ModelMetadata {
            version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().timestamp(),
            max_iter: options.max_iter,
            learning_rate: options.learning_rate,
            n_samples,
        },
    })
}

/// Per-feature mean and population standard deviation. Constant columns
/// get a unit deviation so standardization stays defined.
fn standardize_stats(rows: &[Vec<f64>], n_features: usize) -> Standardization {
    let n = rows.len() as f64;
    let mut means = vec![0.0f64; n_features];
    for row in rows {
        for (m, &x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = vec![0.0f64; n_features];
    for row in rows {
        for ((s, &x), &m) in stds.iter_mut().zip(row).zip(&means) {
            let d = x - m;
            *s += d * d;
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt();
        if *s < 1e-12 {
            *s = 1.0;
        }
    }

    Standardization { means, stds }
}

/// Run the stage: read the engineered training split, fit with
/// `model_building.max_iter`, persist the artifact.
pub fn run(layout: &DataLayout, params_path: &Path, model_path: &Path) -> Result<()> {
    let outcome = (|| {
        let params = Params::load(params_path)?;
        let max_iter = params.namespace("model_building").usize("max_iter")?;
        let options = TrainingOptions {
            max_iter,
            ..TrainingOptions::default()
        };

        let frame = Frame::from_csv_path(layout.engineered_train())?;
        info!(
            "Training on {} rows from {}",
            frame.n_rows(),
            layout.engineered_train().display()
        );
        let model = fit(&frame, &FeatureSchema::default(), &options)?;
        model.save(model_path)?;
        info!("Model saved to {}", model_path.display());
        Ok(())
    })();
    if let Err(err) = &outcome {
        error!("Training stage failed: {err}");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::{Column, Value};

    fn toy_schema() -> FeatureSchema {
        FeatureSchema {
            features: vec!["x1".to_string(), "x2".to_string()],
            label: "y".to_string(),
        }
    }

    /// Linearly separable frame: y = 1 iff x1 > 0.
    fn separable_frame() -> Frame {
        let x1: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { -1.0 - (i as f64) / 40.0 } else { 1.0 + (i as f64) / 40.0 }).collect();
        let x2: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64).collect();
        let y: Vec<f64> = x1.iter().map(|&v| if v > 0.0 { 1.0 } else { 0.0 }).collect();
        Frame::new(vec![
            Column::numeric("x1", x1),
            Column::numeric("x2", x2),
            Column::numeric("y", y),
        ])
        .unwrap()
    }

    #[test]
    fn test_fit_separates_separable_data() {
        let frame = separable_frame();
        let schema = toy_schema();
        let model = fit(&frame, &schema, &TrainingOptions::default()).unwrap();

        let rows = schema.feature_rows(&frame).unwrap();
        let labels = schema.labels(&frame).unwrap();
        let correct = rows
            .iter()
            .zip(&labels)
            .filter(|(row, &label)| f64::from(model.predict(row)) == label)
            .count();
        assert_eq!(correct, frame.n_rows());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let frame = separable_frame();
        let schema = toy_schema();
        let options = TrainingOptions::default();
        let a = fit(&frame, &schema, &options).unwrap();
        let b = fit(&frame, &schema, &options).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.intercept, b.intercept);
        assert_eq!(a.standardization, b.standardization);
    }

    #[test]
    fn test_missing_label_column_is_rejected() {
        let mut frame = separable_frame();
        frame.drop_column("y");
        let err = fit(&frame, &toy_schema(), &TrainingOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingValue(_)));
    }

    #[test]
    fn test_non_numeric_feature_cell_is_rejected() {
        let mut frame = separable_frame();
        frame.column_mut("x1").unwrap().values[3] = Value::Text("oops".to_string());
        let err = fit(&frame, &toy_schema(), &TrainingOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingValue(_)));
    }

    #[test]
    fn test_non_binary_label_is_rejected() {
        let mut frame = separable_frame();
        frame.column_mut("y").unwrap().values[0] = Value::Number(2.0);
        let err = fit(&frame, &toy_schema(), &TrainingOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingValue(_)));
    }

    #[test]
    fn test_constant_feature_does_not_divide_by_zero() {
        let frame = Frame::new(vec![
            Column::numeric("x1", [1.0, 1.0, 1.0, 1.0]),
            Column::numeric("x2", [0.0, 1.0, 0.0, 1.0]),
            Column::numeric("y", [0.0, 1.0, 0.0, 1.0]),
        ])
        .unwrap();
        let model = fit(&frame, &toy_schema(), &TrainingOptions::default()).unwrap();
        assert!(model.weights.iter().all(|w| w.is_finite()));
        assert_eq!(model.standardization.stds[0], 1.0);
    }

    #[test]
    fn test_run_requires_max_iter_param() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = DataLayout::new(dir.path().join("data"));
        let params_path = dir.path().join("params.yaml");
        std::fs::write(&params_path, "model_building: {}\n")?;

        let err = run(&layout, &params_path, &dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingParam { .. }));
        Ok(())
    }
}
