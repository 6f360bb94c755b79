//! Feature scaling strategies fitted on the training split.
//!
//! Every scaler reduces to a per-column affine map `(value - shift) / scale`
//! with parameters chosen by the selected kind; the fitted parameters are
//! applied unchanged to held-out data.

use std::str::FromStr;

use ndarray::{Array2, Axis};
use statrs::statistics::{Data, OrderStatistics};

use crate::error::PipelineError;

/// Scaler selection, parsed from a configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerKind {
    /// Pass-through.
    None,
    /// Zero mean, unit variance.
    Standard,
    /// Map the fit split into [0, 1].
    MinMax,
    /// Median and interquartile range, robust to outliers.
    Robust,
}

impl FromStr for ScalerKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ScalerKind::None),
            "standard" => Ok(ScalerKind::Standard),
            "minmax" => Ok(ScalerKind::MinMax),
            "robust" => Ok(ScalerKind::Robust),
            _ => Err(PipelineError::Config(format!(
                "Unknown scaler type: '{}'. Available scalers: none, standard, minmax, robust",
                s
            ))),
        }
    }
}

/// Per-column affine scaler.
#[derive(Debug, Clone)]
pub struct Scaler {
    kind: ScalerKind,
    shift: Vec<f32>,
    scale: Vec<f32>,
}

impl Scaler {
    /// Minimum scale to avoid division by zero on constant columns.
    const MIN_SCALE: f32 = 1e-6;

    pub fn new(kind: ScalerKind) -> Self {
        Scaler {
            kind,
            shift: Vec::new(),
            scale: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    /// Fit per-column parameters on the training split.
    pub fn fit(&mut self, x: &Array2<f32>) -> Result<(), PipelineError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(PipelineError::Data(
                "Cannot fit a scaler on an empty matrix".to_string(),
            ));
        }
        let ncols = x.ncols();

        match self.kind {
            ScalerKind::None => {
                self.shift = vec![0.0; ncols];
                self.scale = vec![1.0; ncols];
            }
            ScalerKind::Standard => {
                let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                    PipelineError::Data("Cannot compute column means".to_string())
                })?;
                let var = x.var_axis(Axis(0), 0.0);
                self.shift = mean.to_vec();
                self.scale = var
                    .iter()
                    .map(|v| v.sqrt().max(Self::MIN_SCALE))
                    .collect();
            }
            ScalerKind::MinMax => {
                self.shift = Vec::with_capacity(ncols);
                self.scale = Vec::with_capacity(ncols);
                for col in x.axis_iter(Axis(1)) {
                    let mut lo = f32::INFINITY;
                    let mut hi = f32::NEG_INFINITY;
                    for &v in col.iter() {
                        lo = lo.min(v);
                        hi = hi.max(v);
                    }
                    self.shift.push(lo);
                    self.scale.push((hi - lo).max(Self::MIN_SCALE));
                }
            }
            ScalerKind::Robust => {
                self.shift = Vec::with_capacity(ncols);
                self.scale = Vec::with_capacity(ncols);
                for col in x.axis_iter(Axis(1)) {
                    let values: Vec<f64> = col.iter().map(|&v| v as f64).collect();
                    let mut data = Data::new(values);
                    self.shift.push(data.median() as f32);
                    self.scale
                        .push((data.interquartile_range() as f32).max(Self::MIN_SCALE));
                }
            }
        }
        Ok(())
    }

    /// Apply the fitted parameters to any split.
    pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>, PipelineError> {
        if self.shift.len() != x.ncols() {
            return Err(PipelineError::Data(format!(
                "Scaler fitted on {} columns cannot transform {} columns",
                self.shift.len(),
                x.ncols()
            )));
        }
        if self.kind == ScalerKind::None {
            return Ok(x.clone());
        }

        let mut out = x.clone();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let shift = self.shift[j];
            let scale = self.scale[j];
            col.mapv_inplace(|v| (v - shift) / scale);
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f32>) -> Result<Array2<f32>, PipelineError> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn toy_matrix() -> Array2<f32> {
        Array2::from_shape_vec(
            (5, 2),
            vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0, 5.0, 50.0],
        )
        .expect("valid shape")
    }

    #[test]
    fn unknown_scaler_name_is_a_config_error() {
        let err = "zscore".parse::<ScalerKind>().expect_err("expected error");
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn standard_scaler_centers_the_fit_split() {
        let x = toy_matrix();
        let mut scaler = Scaler::new(ScalerKind::Standard);
        let scaled = scaler.fit_transform(&x).expect("fit_transform");

        for col in scaled.axis_iter(Axis(1)) {
            let n = col.len() as f32;
            let mean: f32 = col.iter().sum::<f32>() / n;
            let var: f32 = col.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
            assert!(mean.abs() < 1e-5, "mean = {}", mean);
            assert!((var - 1.0).abs() < 1e-4, "var = {}", var);
        }
    }

    #[test]
    fn standardizing_already_standardized_data_changes_nothing() {
        let x = toy_matrix();
        let mut scaler = Scaler::new(ScalerKind::Standard);
        let scaled = scaler.fit_transform(&x).expect("fit_transform");

        let mut second = Scaler::new(ScalerKind::Standard);
        let rescaled = second.fit_transform(&scaled).expect("fit_transform");
        for (a, b) in scaled.iter().zip(rescaled.iter()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn minmax_scaler_maps_the_fit_split_into_unit_range() {
        let x = toy_matrix();
        let mut scaler = Scaler::new(ScalerKind::MinMax);
        let scaled = scaler.fit_transform(&x).expect("fit_transform");
        for &v in scaled.iter() {
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
        assert_eq!(scaled[(0, 0)], 0.0);
        assert_eq!(scaled[(4, 0)], 1.0);
    }

    #[test]
    fn robust_scaler_handles_constant_columns() {
        let x = Array2::from_shape_vec((4, 1), vec![7.0, 7.0, 7.0, 7.0]).expect("valid shape");
        let mut scaler = Scaler::new(ScalerKind::Robust);
        let scaled = scaler.fit_transform(&x).expect("fit_transform");
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn none_scaler_is_a_pass_through() {
        let x = toy_matrix();
        let mut scaler = Scaler::new(ScalerKind::None);
        let scaled = scaler.fit_transform(&x).expect("fit_transform");
        assert_eq!(scaled, x);
    }

    #[test]
    fn transforming_before_fit_is_an_error() {
        let x = toy_matrix();
        let scaler = Scaler::new(ScalerKind::Standard);
        let err = scaler.transform(&x).expect_err("expected error");
        assert!(matches!(err, PipelineError::Data(_)));
    }
}
