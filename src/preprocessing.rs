//! Policy-record preprocessing: cleaning and encoding into a numeric matrix.
//!
//! The encoder state (imputation means and categorical vocabularies) is
//! fitted on the training split only and applied unchanged to later splits,
//! so no information leaks from held-out data. The output matrix never
//! contains missing values and keeps one row per input record.

use std::collections::HashSet;

use ndarray::{Array1, Array2};

use crate::config::FeatureConfig;
use crate::data_handling::{ClaimDataset, RawTable};
use crate::error::PipelineError;

/// Encodes raw policy records into a numeric feature matrix.
///
/// Column treatment, in output order:
/// - boolean columns: "Yes" becomes 1, anything else (including a missing
///   cell) becomes 0
/// - numeric columns: parsed as floats, unparseable cells imputed with the
///   training mean; columns not named by the configuration are treated as
///   numeric too, matching the raw passthrough of the policy schema
/// - ordinal columns: encoded by position in the configured category order;
///   a value outside that closed domain is a data error
/// - categorical columns: one-hot on the training vocabulary with the first
///   category dropped; categories unseen at fit time encode as all zeros
#[derive(Debug, Clone)]
pub struct Preprocessor {
    features: FeatureConfig,
    target_column: String,
    fitted: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    boolean_columns: Vec<String>,
    /// Numeric columns with their training-split imputation mean.
    float_columns: Vec<(String, f32)>,
    ordinal_columns: Vec<(String, Vec<String>)>,
    /// Categorical columns with the sorted training vocabulary.
    categorical_columns: Vec<(String, Vec<String>)>,
    feature_names: Vec<String>,
}

impl Preprocessor {
    pub fn new(features: FeatureConfig, target_column: &str) -> Self {
        Preprocessor {
            features,
            target_column: target_column.to_string(),
            fitted: None,
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|f| f.feature_names.as_slice())
    }

    /// Fit encodings on the training split.
    ///
    /// Configured columns absent from the table are skipped here and stay
    /// excluded at transform time.
    pub fn fit(&mut self, table: &RawTable) -> Result<(), PipelineError> {
        if table.column_index(&self.target_column).is_none() {
            return Err(PipelineError::Data(format!(
                "Target column '{}' missing from dataset",
                self.target_column
            )));
        }

        let boolean_columns: Vec<String> = self
            .features
            .boolean_columns
            .iter()
            .filter(|c| table.column_index(c).is_some())
            .cloned()
            .collect();

        let mut float_columns = Vec::new();
        for name in self.float_candidates(table) {
            let col = match table.column_index(&name) {
                Some(col) => col,
                None => continue,
            };
            let mut sum = 0.0f64;
            let mut count = 0usize;
            for row in 0..table.nrows() {
                if let Ok(v) = table.cell(row, col).parse::<f64>() {
                    if v.is_finite() {
                        sum += v;
                        count += 1;
                    }
                }
            }
            if count == 0 && !self.features.float_columns.contains(&name) {
                log::warn!(
                    "Column '{}' is neither configured nor numeric; dropping it",
                    name
                );
                continue;
            }
            let mean = if count > 0 {
                (sum / count as f64) as f32
            } else {
                0.0
            };
            float_columns.push((name, mean));
        }

        let ordinal_columns: Vec<(String, Vec<String>)> = self
            .features
            .ordinal_columns
            .iter()
            .filter(|c| table.column_index(&c.name).is_some())
            .map(|c| (c.name.clone(), c.categories.clone()))
            .collect();

        let mut categorical_columns = Vec::new();
        for name in &self.features.categorical_columns {
            let col = match table.column_index(name) {
                Some(col) => col,
                None => continue,
            };
            let mut seen = HashSet::new();
            for row in 0..table.nrows() {
                let cell = table.cell(row, col);
                if !cell.is_empty() {
                    seen.insert(cell.to_string());
                }
            }
            let mut vocabulary: Vec<String> = seen.into_iter().collect();
            vocabulary.sort();
            categorical_columns.push((name.clone(), vocabulary));
        }

        let mut feature_names: Vec<String> = Vec::new();
        feature_names.extend(boolean_columns.iter().cloned());
        feature_names.extend(float_columns.iter().map(|(n, _)| n.clone()));
        feature_names.extend(ordinal_columns.iter().map(|(n, _)| n.clone()));
        for (name, vocabulary) in &categorical_columns {
            for category in vocabulary.iter().skip(1) {
                feature_names.push(format!("{}_{}", name, category));
            }
        }

        log::debug!(
            "Fitted preprocessor with {} feature columns",
            feature_names.len()
        );
        self.fitted = Some(FittedState {
            boolean_columns,
            float_columns,
            ordinal_columns,
            categorical_columns,
            feature_names,
        });
        Ok(())
    }

    /// Encode a table with the fitted state.
    ///
    /// Every fitted column must be present; a missing one is a data error.
    pub fn transform(&self, table: &RawTable) -> Result<ClaimDataset, PipelineError> {
        let fitted = self.fitted.as_ref().ok_or_else(|| {
            PipelineError::Data("Preprocessor::transform called before fit".to_string())
        })?;

        let target_col = table.column_index(&self.target_column).ok_or_else(|| {
            PipelineError::Data(format!(
                "Target column '{}' missing from dataset",
                self.target_column
            ))
        })?;

        let resolve = |name: &str| {
            table.column_index(name).ok_or_else(|| {
                PipelineError::Data(format!("Required column '{}' missing from dataset", name))
            })
        };
        let bool_idx: Vec<usize> = fitted
            .boolean_columns
            .iter()
            .map(|n| resolve(n))
            .collect::<Result<_, _>>()?;
        let float_idx: Vec<usize> = fitted
            .float_columns
            .iter()
            .map(|(n, _)| resolve(n))
            .collect::<Result<_, _>>()?;
        let ordinal_idx: Vec<usize> = fitted
            .ordinal_columns
            .iter()
            .map(|(n, _)| resolve(n))
            .collect::<Result<_, _>>()?;
        let categorical_idx: Vec<usize> = fitted
            .categorical_columns
            .iter()
            .map(|(n, _)| resolve(n))
            .collect::<Result<_, _>>()?;

        let n = table.nrows();
        let m = fitted.feature_names.len();
        let mut buf = Vec::with_capacity(n * m);
        let mut labels = Vec::with_capacity(n);

        for row in 0..n {
            for (k, _) in fitted.boolean_columns.iter().enumerate() {
                buf.push(if table.cell(row, bool_idx[k]) == "Yes" {
                    1.0
                } else {
                    0.0
                });
            }
            for (k, (_, mean)) in fitted.float_columns.iter().enumerate() {
                let value = table
                    .cell(row, float_idx[k])
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .unwrap_or(*mean);
                buf.push(value);
            }
            for (k, (name, categories)) in fitted.ordinal_columns.iter().enumerate() {
                let cell = table.cell(row, ordinal_idx[k]);
                let position = categories.iter().position(|c| c == cell).ok_or_else(|| {
                    PipelineError::Data(format!(
                        "Value '{}' of ordinal column '{}' is outside the configured domain",
                        cell, name
                    ))
                })?;
                buf.push(position as f32);
            }
            for (k, (_, vocabulary)) in fitted.categorical_columns.iter().enumerate() {
                let cell = table.cell(row, categorical_idx[k]);
                for category in vocabulary.iter().skip(1) {
                    buf.push(if cell == category.as_str() { 1.0 } else { 0.0 });
                }
            }
            labels.push(parse_label(table.cell(row, target_col))?);
        }

        let x = Array2::from_shape_vec((n, m), buf)?;
        ClaimDataset::new(x, Array1::from_vec(labels), fitted.feature_names.clone())
    }

    pub fn fit_transform(&mut self, table: &RawTable) -> Result<ClaimDataset, PipelineError> {
        self.fit(table)?;
        self.transform(table)
    }

    /// Configured numeric columns first, then every leftover column that is
    /// neither an identifier, the target, nor otherwise configured.
    fn float_candidates(&self, table: &RawTable) -> Vec<String> {
        let mut candidates: Vec<String> = self.features.float_columns.clone();
        for header in table.headers() {
            if header == &self.target_column
                || self.features.id_columns.contains(header)
                || self.features.boolean_columns.contains(header)
                || self.features.float_columns.contains(header)
                || self.features.categorical_columns.contains(header)
                || self
                    .features
                    .ordinal_columns
                    .iter()
                    .any(|c| &c.name == header)
            {
                continue;
            }
            candidates.push(header.clone());
        }
        candidates
    }
}

fn parse_label(cell: &str) -> Result<i32, PipelineError> {
    match cell {
        "1" | "Yes" | "yes" | "true" | "True" => Ok(1),
        "0" | "No" | "no" | "false" | "False" => Ok(0),
        "" => Err(PipelineError::Data("Missing target value".to_string())),
        other => Err(PipelineError::Data(format!(
            "Unparseable target value '{}'",
            other
        ))),
    }
}
