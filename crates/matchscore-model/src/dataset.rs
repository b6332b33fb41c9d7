//! CSV dataset loading for training

use matchscore_core::{Error, FeatureSchema, Result};
use ndarray::{Array2, Axis};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Numeric feature matrix plus integer targets, with the column order it was read in
#[derive(Debug, Clone)]
pub struct TabularDataset {
    schema: FeatureSchema,
    target: String,
    records: Array2<f64>,
    targets: Vec<i64>,
}

impl TabularDataset {
    /// Read a CSV file, dropping `drop_columns` (when present) and splitting off `target`
    pub fn from_csv_path(
        path: impl AsRef<Path>,
        target: &str,
        drop_columns: &[String],
    ) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading dataset from {}", path.display());
        let file = std::fs::File::open(path)
            .map_err(|e| Error::dataset(format!("cannot open {}: {}", path.display(), e)))?;
        Self::from_reader(file, target, drop_columns)
    }

    /// Read CSV data with a header row from any reader
    pub fn from_reader<R: Read>(reader: R, target: &str, drop_columns: &[String]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::dataset(format!("cannot read header row: {e}")))?
            .clone();

        let dropped: Vec<&str> = headers
            .iter()
            .filter(|h| drop_columns.iter().any(|d| d.as_str() == *h))
            .collect();
        if !dropped.is_empty() {
            debug!("Dropping columns: {:?}", dropped);
        }

        let target_index = headers
            .iter()
            .position(|h| h == target)
            .ok_or_else(|| Error::dataset(format!("target column '{target}' not found in CSV")))?;

        let feature_indices: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != target_index && !drop_columns.iter().any(|d| d.as_str() == *h))
            .map(|(i, _)| i)
            .collect();

        let schema = FeatureSchema::new(feature_indices.iter().map(|&i| headers[i].to_string()))
            .map_err(|e| Error::dataset(format!("invalid feature columns: {e}")))?;

        let mut values = Vec::new();
        let mut targets = Vec::new();

        for (row, record) in reader.records().enumerate() {
            // header is line 1
            let line = row + 2;
            let record = record.map_err(|e| Error::dataset(format!("line {line}: {e}")))?;

            for &index in &feature_indices {
                let cell = record.get(index).unwrap_or("");
                values.push(parse_feature(cell, &headers[index], line)?);
            }

            let cell = record.get(target_index).unwrap_or("");
            targets.push(parse_target(cell, target, line)?);
        }

        if targets.is_empty() {
            return Err(Error::dataset("dataset has no data rows"));
        }

        let records = Array2::from_shape_vec((targets.len(), feature_indices.len()), values)
            .map_err(|e| Error::dataset(e.to_string()))?;

        info!(
            "Loaded {} rows with {} feature columns",
            records.nrows(),
            records.ncols()
        );

        Ok(Self {
            schema,
            target: target.to_string(),
            records,
            targets,
        })
    }

    /// Feature columns in file order
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn records(&self) -> &Array2<f64> {
        &self.records
    }

    pub fn targets(&self) -> &[i64] {
        &self.targets
    }

    pub fn n_rows(&self) -> usize {
        self.targets.len()
    }

    /// Row count per label, ascending by label
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.targets {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// Records and targets for the given row indices
    pub fn select(&self, rows: &[usize]) -> (Array2<f64>, Vec<i64>) {
        let records = self.records.select(Axis(0), rows);
        let targets = rows.iter().map(|&row| self.targets[row]).collect();
        (records, targets)
    }

    /// Plain-text table of the first `n` rows, features then target
    pub fn head(&self, n: usize) -> String {
        let mut out = String::new();
        let header: Vec<&str> = self
            .schema
            .iter()
            .chain(std::iter::once(self.target.as_str()))
            .collect();
        let _ = writeln!(out, "{}", header.join("  "));

        for (row, label) in self.records.rows().into_iter().zip(&self.targets).take(n) {
            let cells: Vec<String> = row
                .iter()
                .map(|v| format!("{v}"))
                .chain(std::iter::once(label.to_string()))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  "));
        }
        out
    }
}

fn parse_feature(cell: &str, column: &str, line: usize) -> Result<f64> {
    if cell.is_empty() {
        return Err(Error::dataset(format!(
            "line {line}: column '{column}' is empty"
        )));
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::dataset(format!(
            "line {line}: column '{column}' has non-numeric value '{cell}'"
        ))),
    }
}

fn parse_target(cell: &str, column: &str, line: usize) -> Result<i64> {
    if let Ok(label) = cell.parse::<i64>() {
        return Ok(label);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(Error::dataset(format!(
            "line {line}: target '{column}' must be an integer label, got '{cell}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_columns() -> Vec<String> {
        vec!["Date".to_string(), "Opponent".to_string()]
    }

    const CSV: &str = "\
Date,Opponent,Is_Home,Goals,Result,Possession
2024-08-17,Wolves,1,2,1,55.5
2024-08-24,Aston Villa,0,2,1,48
2024-08-31,Brighton,1,1,0.0,61
";

    #[test]
    fn test_drops_identifiers_and_splits_target() {
        let dataset = TabularDataset::from_reader(CSV.as_bytes(), "Result", &drop_columns()).unwrap();

        assert_eq!(dataset.schema().names(), &["Is_Home", "Goals", "Possession"]);
        assert_eq!(dataset.targets(), &[1, 1, 0]);
        assert_eq!(dataset.records().dim(), (3, 3));
        assert_eq!(dataset.records()[[0, 2]], 55.5);
        assert_eq!(dataset.class_counts().get(&1), Some(&2));
    }

    #[test]
    fn test_identifier_columns_are_optional() {
        let csv = "Goals,Shots,Result\n1,5,0\n3,9,1\n";
        let dataset = TabularDataset::from_reader(csv.as_bytes(), "Result", &drop_columns()).unwrap();
        assert_eq!(dataset.schema().names(), &["Goals", "Shots"]);
    }

    #[test]
    fn test_missing_target_column() {
        let csv = "Goals,Shots\n1,5\n";
        let err = TabularDataset::from_reader(csv.as_bytes(), "Result", &drop_columns()).unwrap_err();
        assert!(err.to_string().contains("'Result'"));
    }

    #[test]
    fn test_non_numeric_cell_names_line_and_column() {
        let csv = "Goals,Shots,Result\n1,5,0\n3,lots,1\n";
        let err = TabularDataset::from_reader(csv.as_bytes(), "Result", &drop_columns()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("'Shots'"), "{message}");
    }

    #[test]
    fn test_string_targets_are_rejected() {
        let csv = "Goals,Result\n1,W\n";
        assert!(TabularDataset::from_reader(csv.as_bytes(), "Result", &drop_columns()).is_err());
    }

    #[test]
    fn test_select_and_head() {
        let dataset = TabularDataset::from_reader(CSV.as_bytes(), "Result", &drop_columns()).unwrap();
        let (records, targets) = dataset.select(&[2, 0]);
        assert_eq!(targets, vec![0, 1]);
        assert_eq!(records[[0, 2]], 61.0);

        let head = dataset.head(2);
        assert!(head.starts_with("Is_Home  Goals  Possession  Result\n"));
        assert_eq!(head.lines().count(), 3);
    }
}
