//! Shared feature schema
//!
//! Training and evaluation must agree on the feature columns and the
//! label column. The schema is defined once here, embedded into the
//! model artifact at training time, and read back from the artifact at
//! evaluation time so the two sides cannot drift.

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Value};

/// Feature columns expected after preprocessing, in model order.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "Pclass",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Fare",
    "Embarked_Q",
    "Embarked_S",
];

/// Label column name.
pub const LABEL_COLUMN: &str = "Survived";

/// Ordered feature column names plus the label column name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub features: Vec<String>,
    pub label: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            label: LABEL_COLUMN.to_string(),
        }
    }
}

impl FeatureSchema {
    /// First schema column (features, then label) absent from the frame.
    pub fn first_missing<'a>(&'a self, frame: &Frame) -> Option<&'a str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.label.as_str()))
            .find(|name| !frame.has_column(name))
    }

    /// Extract the row-major design matrix. Every schema feature cell
    /// must be a finite number.
    pub fn feature_rows(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, String> {
        let columns: Vec<_> = self
            .features
            .iter()
            .map(|name| {
                frame
                    .column(name)
                    .ok_or_else(|| format!("column `{name}` absent"))
            })
            .collect::<Result<_, _>>()?;

        let n_rows = frame.n_rows();
        let mut rows = Vec::with_capacity(n_rows);
        for row_idx in 0..n_rows {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = numeric_cell(&column.values[row_idx], &column.name, row_idx)?;
                row.push(value);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Extract the label vector; every cell must be numeric.
    pub fn labels(&self, frame: &Frame) -> Result<Vec<f64>, String> {
        let column = frame
            .column(&self.label)
            .ok_or_else(|| format!("column `{}` absent", self.label))?;
        column
            .values
            .iter()
            .enumerate()
            .map(|(row_idx, value)| numeric_cell(value, &self.label, row_idx))
            .collect()
    }
}

fn numeric_cell(value: &Value, column: &str, row_idx: usize) -> Result<f64, String> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Missing => Err(format!("column `{column}`, row {row_idx}: missing value")),
        Value::Text(s) => Err(format!(
            "column `{column}`, row {row_idx}: non-numeric value `{s}`"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn engineered_frame() -> Frame {
        let mut columns = Vec::new();
        for name in FEATURE_COLUMNS {
            columns.push(Column::numeric(name, [1.0, 0.0]));
        }
        columns.push(Column::numeric(LABEL_COLUMN, [0.0, 1.0]));
        Frame::new(columns).unwrap()
    }

    #[test]
    fn test_complete_frame_has_no_missing_column() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.first_missing(&engineered_frame()), None);
    }

    #[test]
    fn test_first_missing_reports_dropped_feature() {
        let schema = FeatureSchema::default();
        let mut frame = engineered_frame();
        frame.drop_column("Embarked_Q");
        assert_eq!(schema.first_missing(&frame), Some("Embarked_Q"));

        let mut frame = engineered_frame();
        frame.drop_column(LABEL_COLUMN);
        assert_eq!(schema.first_missing(&frame), Some(LABEL_COLUMN));
    }

    #[test]
    fn test_feature_rows_are_row_major_in_schema_order() {
        let schema = FeatureSchema::default();
        let rows = schema.feature_rows(&engineered_frame()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![1.0; FEATURE_COLUMNS.len()]);
        assert_eq!(rows[1], vec![0.0; FEATURE_COLUMNS.len()]);
    }

    #[test]
    fn test_text_cell_is_rejected() {
        let schema = FeatureSchema::default();
        let mut frame = engineered_frame();
        frame.column_mut("Sex").unwrap().values[1] = Value::Text("female".to_string());
        let err = schema.feature_rows(&frame).unwrap_err();
        assert!(err.contains("Sex"));
        assert!(err.contains("non-numeric"));
    }
}
