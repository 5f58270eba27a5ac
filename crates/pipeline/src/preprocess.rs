//! Data preprocessing stage
//!
//! Cleans and encodes one raw split at a time, in a fixed order: median
//! imputation of `Age`, mode imputation of `Embarked`, binary encoding
//! of `Sex`, then drop-first one-hot encoding of `Embarked`.
//!
//! Train and test are processed independently with the same logic, so
//! each split is imputed from its own median and mode. That asymmetry is
//! inherited from the original pipeline; see DESIGN.md.

use std::collections::BTreeSet;

use tracing::{debug, error};

use voyage_core::{Column, DataLayout, Frame, PipelineError, Result, Value};

/// Apply the full cleaning and encoding pass to one split.
pub fn preprocess(mut frame: Frame) -> Result<Frame> {
    debug!("Preprocessing frame with {} rows", frame.n_rows());
    impute_median(&mut frame, "Age")?;
    impute_mode(&mut frame, "Embarked")?;
    encode_binary(&mut frame, "Sex", "male", "female")?;
    one_hot_drop_first(&mut frame, "Embarked")?;
    debug!("Preprocessing complete; frame now has {} columns", frame.n_cols());
    Ok(frame)
}

/// Fill missing cells of a numeric column with that column's median.
pub fn impute_median(frame: &mut Frame, name: &str) -> Result<()> {
    let column = frame
        .column_mut(name)
        .ok_or_else(|| preprocess_error(format!("column `{name}` absent")))?;
    let median = column
        .median()
        .ok_or_else(|| preprocess_error(format!("column `{name}` has no numeric values to impute from")))?;
    let filled = column.missing_count();
    for value in &mut column.values {
        if value.is_missing() {
            *value = Value::Number(median);
        }
    }
    debug!("Imputed {filled} missing `{name}` cells with median {median}");
    Ok(())
}

/// Fill missing cells of a categorical column with its most frequent value.
pub fn impute_mode(frame: &mut Frame, name: &str) -> Result<()> {
    let column = frame
        .column_mut(name)
        .ok_or_else(|| preprocess_error(format!("column `{name}` absent")))?;
    let mode = column
        .mode()
        .ok_or_else(|| preprocess_error(format!("column `{name}` has no values to impute from")))?;
    let filled = column.missing_count();
    for value in &mut column.values {
        if value.is_missing() {
            *value = Value::Text(mode.clone());
        }
    }
    debug!("Imputed {filled} missing `{name}` cells with mode `{mode}`");
    Ok(())
}

/// Encode a two-category column as 0/1 in place. Missing cells stay
/// missing; any other category is an error.
pub fn encode_binary(frame: &mut Frame, name: &str, zero: &str, one: &str) -> Result<()> {
    let column = frame
        .column_mut(name)
        .ok_or_else(|| preprocess_error(format!("column `{name}` absent")))?;
    for (row_idx, value) in column.values.iter_mut().enumerate() {
        let encoded = match &*value {
            Value::Text(s) if s == zero => Value::Number(0.0),
            Value::Text(s) if s == one => Value::Number(1.0),
            Value::Number(n) if *n == 0.0 || *n == 1.0 => Value::Number(*n),
            Value::Missing => Value::Missing,
            other => {
                return Err(preprocess_error(format!(
                    "column `{name}`, row {row_idx}: unexpected category {other:?}"
                )))
            }
        };
        *value = encoded;
    }
    debug!("Encoded `{name}` as binary ({zero}=0, {one}=1)");
    Ok(())
}

/// One-hot encode a categorical column, dropping the first category in
/// sorted order. Dummy columns are appended as `<name>_<category>` and
/// the original column is removed. Returns the number of columns added.
pub fn one_hot_drop_first(frame: &mut Frame, name: &str) -> Result<usize> {
    let column = frame
        .column(name)
        .ok_or_else(|| preprocess_error(format!("column `{name}` absent")))?;

    let categories: BTreeSet<String> = column
        .values
        .iter()
        .filter_map(|v| match v {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format!("{n}")),
            Value::Missing => None,
        })
        .collect();
    if categories.is_empty() {
        return Err(preprocess_error(format!(
            "column `{name}` has no categories to encode"
        )));
    }

    let values = frame.drop_column(name).map(|c| c.values).unwrap_or_default();
    let kept: Vec<&String> = categories.iter().skip(1).collect();
    for category in &kept {
        let dummy = values
            .iter()
            .map(|v| {
                let is_match = match v {
                    Value::Text(s) => &s == category,
                    Value::Number(n) => &format!("{n}") == *category,
                    Value::Missing => false,
                };
                Value::Number(if is_match { 1.0 } else { 0.0 })
            })
            .collect();
        frame.push_column(Column::new(format!("{name}_{category}"), dummy))?;
    }
    debug!(
        "One-hot encoded `{name}` into {} dummy columns (dropped first of {} categories)",
        kept.len(),
        categories.len()
    );
    Ok(kept.len())
}

/// Run the stage: read both raw splits, transform both fully in memory,
/// then write `interim/{train,test}_processed.csv`. Nothing is written
/// if either transform fails.
pub fn run(layout: &DataLayout) -> Result<()> {
    let outcome = (|| {
        let train = Frame::from_csv_path(layout.raw_train())?;
        let test = Frame::from_csv_path(layout.raw_test())?;

        let train = preprocess(train)?;
        let test = preprocess(test)?;

        train.write_csv_path(layout.interim_train())?;
        test.write_csv_path(layout.interim_test())?;
        debug!(
            "Wrote processed splits to {} and {}",
            layout.interim_train().display(),
            layout.interim_test().display()
        );
        Ok(())
    })();
    if let Err(err) = &outcome {
        error!("Preprocessing stage failed: {err}");
    }
    outcome
}

fn preprocess_error(message: String) -> PipelineError {
    PipelineError::Preprocess(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> Frame {
        Frame::new(vec![
            Column::new(
                "Age",
                vec![
                    Value::Number(22.0),
                    Value::Missing,
                    Value::Number(26.0),
                    Value::Number(35.0),
                    Value::Missing,
                ],
            ),
            Column::text("Sex", ["male", "female", "female", "male", "male"]),
            Column::new(
                "Embarked",
                vec![
                    Value::Text("S".to_string()),
                    Value::Text("C".to_string()),
                    Value::Missing,
                    Value::Text("S".to_string()),
                    Value::Text("Q".to_string()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_preprocess_leaves_no_missing_values() {
        let frame = preprocess(raw_frame()).unwrap();
        assert_eq!(frame.column("Age").unwrap().missing_count(), 0);
        assert_eq!(frame.column("Sex").unwrap().missing_count(), 0);
        assert_eq!(frame.column("Embarked_Q").unwrap().missing_count(), 0);
        assert_eq!(frame.column("Embarked_S").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_age_median_comes_from_the_same_split() {
        let frame = preprocess(raw_frame()).unwrap();
        // Median of {22, 26, 35} is 26.
        let age = frame.column("Age").unwrap();
        assert_eq!(age.values[1], Value::Number(26.0));
        assert_eq!(age.values[4], Value::Number(26.0));
    }

    #[test]
    fn test_embarked_mode_fills_missing_cell() {
        let frame = preprocess(raw_frame()).unwrap();
        // Mode of {S, C, S, Q} is S; the missing row becomes S.
        assert_eq!(
            frame.column("Embarked_S").unwrap().values[2],
            Value::Number(1.0)
        );
    }

    #[test]
    fn test_sex_is_binary_encoded() {
        let frame = preprocess(raw_frame()).unwrap();
        let sex = &frame.column("Sex").unwrap().values;
        assert_eq!(sex[0], Value::Number(0.0));
        assert_eq!(sex[1], Value::Number(1.0));
    }

    #[test]
    fn test_unexpected_sex_category_fails() {
        let mut frame = raw_frame();
        frame.column_mut("Sex").unwrap().values[3] = Value::Text("unknown".to_string());
        let err = preprocess(frame).unwrap_err();
        assert!(matches!(err, PipelineError::Preprocess(_)));
    }

    #[test]
    fn test_one_hot_drops_first_category_and_original_column() {
        let mut frame = raw_frame();
        impute_mode(&mut frame, "Embarked").unwrap();
        let added = one_hot_drop_first(&mut frame, "Embarked").unwrap();

        // Three categories (C, Q, S) yield two dummies; C is the dropped one.
        assert_eq!(added, 2);
        assert!(!frame.has_column("Embarked"));
        assert!(!frame.has_column("Embarked_C"));
        assert!(frame.has_column("Embarked_Q"));
        assert!(frame.has_column("Embarked_S"));

        // Row 1 embarked at C: both dummies are zero.
        assert_eq!(frame.column("Embarked_Q").unwrap().values[1], Value::Number(0.0));
        assert_eq!(frame.column("Embarked_S").unwrap().values[1], Value::Number(0.0));
    }

    #[test]
    fn test_preprocess_is_idempotent_on_clean_columns() {
        let first = preprocess(raw_frame()).unwrap();

        // A second pass over the already-clean numeric columns changes
        // nothing: no cells are missing and `Sex` is already 0/1.
        let mut second = first.clone();
        impute_median(&mut second, "Age").unwrap();
        encode_binary(&mut second, "Sex", "male", "female").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preserves_row_count() {
        let frame = raw_frame();
        let rows = frame.n_rows();
        let processed = preprocess(frame).unwrap();
        assert_eq!(processed.n_rows(), rows);
    }

    #[test]
    fn test_run_requires_raw_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        assert!(run(&layout).is_err());
    }
}
