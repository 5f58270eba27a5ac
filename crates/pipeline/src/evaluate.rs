//! Model evaluation stage
//!
//! Scores the persisted model against the engineered test split and
//! writes the terminal metrics report: accuracy, a 2x2 confusion matrix
//! (rows = actual, columns = predicted), and per-class
//! precision/recall/F1 with support. The report file is only written
//! after every metric has been computed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use voyage_core::{DataLayout, Frame, PipelineError, Result};

use crate::model::LogisticModel;

/// Precision/recall/F1 for one class
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Terminal metrics artifact
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: f64,
    /// `confusion_matrix[actual][predicted]` over classes 0 and 1.
    pub confusion_matrix: [[usize; 2]; 2],
    /// Per-class breakdown keyed by class label ("0", "1").
    pub classes: BTreeMap<String, ClassMetrics>,
}

/// Score the model against a test frame.
pub fn evaluate(model: &LogisticModel, frame: &Frame) -> Result<MetricsReport> {
    if let Some(column) = model.schema.first_missing(frame) {
        return Err(PipelineError::SchemaMismatch(column.to_string()));
    }
    let rows = model
        .schema
        .feature_rows(frame)
        .map_err(PipelineError::Evaluation)?;
    let labels = model.schema.labels(frame).map_err(PipelineError::Evaluation)?;
    if rows.is_empty() {
        return Err(PipelineError::Evaluation(
            "test data has no rows".to_string(),
        ));
    }

    let mut confusion = [[0usize; 2]; 2];
    for (row, &label) in rows.iter().zip(&labels) {
        let actual = match label {
            l if l == 0.0 => 0usize,
            l if l == 1.0 => 1usize,
            other => {
                return Err(PipelineError::Evaluation(format!(
                    "label column `{}` must be binary 0/1, found {other}",
                    model.schema.label
                )))
            }
        };
        let predicted = model.predict(row) as usize;
        confusion[actual][predicted] += 1;
    }

    let total: usize = confusion.iter().flatten().sum();
    let accuracy = (confusion[0][0] + confusion[1][1]) as f64 / total as f64;

    let mut classes = BTreeMap::new();
    for class in 0..2usize {
        let true_positive = confusion[class][class];
        let predicted_positive: usize = confusion[0][class] + confusion[1][class];
        let support = confusion[class][0] + confusion[class][1];

        let precision = ratio(true_positive, predicted_positive);
        let recall = ratio(true_positive, support);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        classes.insert(
            class.to_string(),
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support,
            },
        );
    }

    debug!("Evaluated {total} rows; accuracy {accuracy:.4}");
    Ok(MetricsReport {
        accuracy,
        confusion_matrix: confusion,
        classes,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn save_report(report: &MetricsReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Run the stage: load the artifact and the engineered test split,
/// evaluate, then write the metrics file. Nothing is written on failure.
pub fn run(layout: &DataLayout, model_path: &Path, report_path: &Path) -> Result<()> {
    let outcome = (|| {
        let model = LogisticModel::load(model_path)?;
        let frame = Frame::from_csv_path(layout.engineered_test())?;
        info!(
            "Evaluating {} against {} test rows",
            model_path.display(),
            frame.n_rows()
        );
        let report = evaluate(&model, &frame)?;
        save_report(&report, report_path)?;
        info!(
            "Metrics written to {} (accuracy {:.4})",
            report_path.display(),
            report.accuracy
        );
        Ok(())
    })();
    if let Err(err) = &outcome {
        error!("Evaluation stage failed: {err}");
    }
    outcome
}
