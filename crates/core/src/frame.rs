//! Column-oriented tabular frame
//!
//! The on-disk contract between stages is CSV with a header row. Cells
//! are typed on load: empty cells become [`Value::Missing`], cells that
//! parse as a float become [`Value::Number`], everything else stays
//! [`Value::Text`].

use std::io::{Read, Write};
use std::path::Path;

use crate::errors::{PipelineError, Result};

/// A single cell
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    fn parse(cell: &str) -> Value {
        if cell.is_empty() {
            return Value::Missing;
        }
        match cell.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(cell.to_string()),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Number(n) => format!("{n}"),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }
}

/// A named column of cells
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Value::Number).collect())
    }

    pub fn text(
        name: impl Into<String>,
        values: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self::new(
            name,
            values
                .into_iter()
                .map(|s| Value::Text(s.to_string()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Median of the numeric cells, ignoring missing and text cells.
    /// Even counts average the two middle values.
    pub fn median(&self) -> Option<f64> {
        let mut numbers: Vec<f64> = self.values.iter().filter_map(Value::as_number).collect();
        if numbers.is_empty() {
            return None;
        }
        numbers.sort_by(|a, b| a.total_cmp(b));
        let mid = numbers.len() / 2;
        if numbers.len() % 2 == 1 {
            Some(numbers[mid])
        } else {
            Some((numbers[mid - 1] + numbers[mid]) / 2.0)
        }
    }

    /// Most frequent non-missing cell, rendered as text. Ties resolve to
    /// the lexicographically smallest value so reruns are stable.
    pub fn mode(&self) -> Option<String> {
        let mut counts = std::collections::BTreeMap::new();
        for value in &self.values {
            let key = match value {
                Value::Text(s) => s.clone(),
                Value::Number(n) => format!("{n}"),
                Value::Missing => continue,
            };
            *counts.entry(key).or_insert(0usize) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(key, _)| key)
    }
}

/// An ordered set of equally sized named columns
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for column in &columns {
                if column.len() != rows {
                    return Err(PipelineError::DatasetParse(format!(
                        "column `{}` has {} rows, expected {}",
                        column.name,
                        column.len(),
                        rows
                    )));
                }
            }
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(PipelineError::DatasetParse(format!(
                    "duplicate column name `{}`",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Append a column; its length must match the frame.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(PipelineError::DatasetParse(format!(
                "column `{}` has {} rows, expected {}",
                column.name,
                column.len(),
                self.n_rows()
            )));
        }
        if self.has_column(&column.name) {
            return Err(PipelineError::DatasetParse(format!(
                "duplicate column name `{}`",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column, returning it if it was present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    /// New frame holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                values: indices
                    .iter()
                    .map(|&idx| column.values[idx].clone())
                    .collect(),
            })
            .collect();
        Frame { columns }
    }

    /// Parse a CSV document with a header row.
    pub fn read_csv<R: Read>(reader: R) -> Result<Frame> {
        let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|err| PipelineError::DatasetParse(err.to_string()))?
            .clone();

        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();

        for (row_idx, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|err| {
                PipelineError::DatasetParse(format!("row {}: {err}", row_idx + 1))
            })?;
            if record.len() != columns.len() {
                return Err(PipelineError::DatasetParse(format!(
                    "row {}: expected {} fields, got {}",
                    row_idx + 1,
                    columns.len(),
                    record.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                column.values.push(Value::parse(cell));
            }
        }

        Frame::new(columns)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Frame> {
        let file = std::fs::File::open(path.as_ref())?;
        Frame::read_csv(file)
    }

    /// Write the frame as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .map_err(|err| PipelineError::DatasetParse(err.to_string()))?;
        for row in 0..self.n_rows() {
            csv_writer
                .write_record(self.columns.iter().map(|c| c.values[row].render()))
                .map_err(|err| PipelineError::DatasetParse(err.to_string()))?;
        }
        csv_writer.flush().map_err(PipelineError::Io)?;
        Ok(())
    }

    /// Write to a path, creating parent directories as needed.
    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Column::numeric("Age", [22.0, 38.0, 26.0]),
            Column::text("Name", ["Braund, Owen", "Cumings, Florence", "Heikkinen, Laina"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_round_trip_with_quoted_commas() -> Result<()> {
        let frame = sample_frame();
        let mut buffer = Vec::new();
        frame.write_csv(&mut buffer)?;
        let reloaded = Frame::read_csv(buffer.as_slice())?;
        assert_eq!(frame, reloaded);
        Ok(())
    }

    #[test]
    fn test_missing_cells_round_trip() -> Result<()> {
        let csv = "Age,Embarked\n22,S\n,Q\n30,\n";
        let frame = Frame::read_csv(csv.as_bytes())?;
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.column("Age").unwrap().missing_count(), 1);
        assert_eq!(frame.column("Embarked").unwrap().missing_count(), 1);

        let mut buffer = Vec::new();
        frame.write_csv(&mut buffer)?;
        let reloaded = Frame::read_csv(buffer.as_slice())?;
        assert_eq!(frame, reloaded);
        Ok(())
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let csv = "A,B\n1,2\n3\n";
        let err = Frame::read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::PipelineError::DatasetParse(_)));
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let csv = "A,A\n1,2\n";
        let err = Frame::read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::PipelineError::DatasetParse(_)));
    }

    #[test]
    fn test_median_odd_and_even() {
        let odd = Column::numeric("x", [3.0, 1.0, 2.0]);
        assert_eq!(odd.median(), Some(2.0));

        let even = Column::new(
            "x",
            vec![
                Value::Number(1.0),
                Value::Number(4.0),
                Value::Missing,
                Value::Number(2.0),
                Value::Number(3.0),
            ],
        );
        assert_eq!(even.median(), Some(2.5));

        let all_missing = Column::new("x", vec![Value::Missing, Value::Missing]);
        assert_eq!(all_missing.median(), None);
    }

    #[test]
    fn test_mode_prefers_smallest_on_tie() {
        let column = Column::text("Embarked", ["S", "Q", "S", "Q", "C"]);
        assert_eq!(column.mode(), Some("Q".to_string()));

        let full_tie = Column::text("Embarked", ["S", "C", "Q"]);
        assert_eq!(full_tie.mode(), Some("C".to_string()));

        let clear = Column::text("Embarked", ["S", "S", "Q"]);
        assert_eq!(clear.mode(), Some("S".to_string()));
    }

    #[test]
    fn test_take_rows_preserves_order() {
        let frame = sample_frame();
        let subset = frame.take_rows(&[2, 0]);
        assert_eq!(subset.n_rows(), 2);
        assert_eq!(
            subset.column("Age").unwrap().values[0],
            Value::Number(26.0)
        );
        assert_eq!(
            subset.column("Age").unwrap().values[1],
            Value::Number(22.0)
        );
    }

    #[test]
    fn test_push_and_drop_column() -> Result<()> {
        let mut frame = sample_frame();
        frame.push_column(Column::numeric("Fare", [7.25, 71.28, 7.92]))?;
        assert!(frame.has_column("Fare"));
        assert!(frame.push_column(Column::numeric("Fare", [0.0, 0.0, 0.0])).is_err());
        assert!(frame.drop_column("Fare").is_some());
        assert!(frame.drop_column("Fare").is_none());
        Ok(())
    }
}
