//! Loading and holding policy datasets.
//!
//! `RawTable` is the string-typed view of the input CSV; `ClaimDataset` is
//! the fully numeric form produced by preprocessing. The train/test split
//! happens on raw rows so every fitted transformation downstream sees
//! training data only.
use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;

/// Raw policy records as read from disk: a header row plus string cells.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, PipelineError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(PipelineError::Data(format!(
                    "Row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    headers.len()
                )));
            }
        }
        Ok(RawTable { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    /// New table containing only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Read a policy CSV into a `RawTable`.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .map_err(|e| {
            PipelineError::Data(format!(
                "Failed to open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }
    if rows.is_empty() {
        return Err(PipelineError::Data(format!(
            "No data rows in {}",
            path.as_ref().display()
        )));
    }

    log::debug!(
        "Loaded {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.as_ref().display()
    );
    RawTable::new(headers, rows)
}

/// Stratified train/test split over raw rows.
///
/// Each target value contributes proportionally to the held-out set, so the
/// rare claim class cannot vanish from it. Deterministic for a fixed seed;
/// row order within each side follows the input file.
pub fn split_train_test(
    table: &RawTable,
    target_column: &str,
    test_size: f32,
    seed: u64,
) -> Result<(RawTable, RawTable), PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::Config(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let target = table.column_index(target_column).ok_or_else(|| {
        PipelineError::Data(format!(
            "Target column '{}' missing from dataset",
            target_column
        ))
    })?;

    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for row in 0..table.nrows() {
        groups
            .entry(table.cell(row, target).to_string())
            .or_default()
            .push(row);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();
    for indices in groups.values() {
        let mut indices = indices.clone();
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f32) * test_size).round() as usize;
        let (test_part, train_part) = indices.split_at(n_test.min(indices.len()));
        test_idx.extend_from_slice(test_part);
        train_idx.extend_from_slice(train_part);
    }
    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(PipelineError::Data(format!(
            "Split produced an empty side ({} train rows, {} test rows)",
            train_idx.len(),
            test_idx.len()
        )));
    }
    train_idx.sort_unstable();
    test_idx.sort_unstable();

    Ok((table.select_rows(&train_idx), table.select_rows(&test_idx)))
}

/// A fully numeric dataset: encoded features plus binary labels.
///
/// Rows of `x` and entries of `y` are parallel; 1 means a claim was filed.
#[derive(Debug, Clone)]
pub struct ClaimDataset {
    pub x: Array2<f32>,
    pub y: Array1<i32>,
    pub feature_names: Vec<String>,
}

impl ClaimDataset {
    pub fn new(
        x: Array2<f32>,
        y: Array1<i32>,
        feature_names: Vec<String>,
    ) -> Result<Self, PipelineError> {
        if x.nrows() != y.len() {
            return Err(PipelineError::Data(format!(
                "Feature matrix has {} rows but label vector has {} entries",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() != feature_names.len() {
            return Err(PipelineError::Data(format!(
                "Feature matrix has {} columns but {} feature names",
                x.ncols(),
                feature_names.len()
            )));
        }
        Ok(ClaimDataset {
            x,
            y,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// (no-claim count, claim count)
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.y.iter().filter(|&&v| v == 1).count();
        (self.y.len() - positives, positives)
    }

    /// New dataset containing only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> ClaimDataset {
        ClaimDataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }

    pub fn log_summary(&self, label: &str) {
        let (negatives, positives) = self.class_counts();
        println!("----- {} -----", label);
        println!(
            "Info: {} claim and {} no-claim policies",
            positives, negatives
        );
        println!("Info: {} encoded feature columns", self.n_features());
        println!("-------------------------------");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_table() -> RawTable {
        let headers = vec!["policy_id".to_string(), "is_claim".to_string()];
        let rows: Vec<Vec<String>> = (0..10)
            .map(|i| {
                vec![
                    format!("P{:03}", i),
                    (if i < 5 { "1" } else { "0" }).to_string(),
                ]
            })
            .collect();
        RawTable::new(headers, rows).expect("valid table")
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        )
        .expect_err("expected data error");
        assert!(matches!(err, PipelineError::Data(_)));
    }

    #[test]
    fn split_is_stratified_and_deterministic() {
        let table = toy_table();
        let (train, test) = split_train_test(&table, "is_claim", 0.2, 42).expect("split");
        assert_eq!(train.nrows(), 8);
        assert_eq!(test.nrows(), 2);

        // Exactly one of the five positives must land in the held-out side.
        let target = test.column_index("is_claim").expect("target column");
        let test_positives = (0..test.nrows())
            .filter(|&r| test.cell(r, target) == "1")
            .count();
        assert_eq!(test_positives, 1);

        let (train2, _test2) = split_train_test(&table, "is_claim", 0.2, 42).expect("split");
        let id = train.column_index("policy_id").expect("id column");
        let ids: Vec<&str> = (0..train.nrows()).map(|r| train.cell(r, id)).collect();
        let ids2: Vec<&str> = (0..train2.nrows()).map(|r| train2.cell(r, id)).collect();
        assert_eq!(ids, ids2);
    }

    #[test]
    fn split_rejects_degenerate_test_size() {
        let table = toy_table();
        let err = split_train_test(&table, "is_claim", 1.5, 0).expect_err("expected error");
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn dataset_checks_shape_agreement() {
        let x = Array2::<f32>::zeros((3, 2));
        let y = Array1::from_vec(vec![1, 0]);
        let err = ClaimDataset::new(x, y, vec!["a".to_string(), "b".to_string()])
            .expect_err("expected data error");
        assert!(matches!(err, PipelineError::Data(_)));
    }
}
