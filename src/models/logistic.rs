use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::config::LogisticParams;
use crate::error::PipelineError;
use crate::models::classifier_trait::ClassifierModel;

/// Logistic regression classifier backed by linfa.
///
/// Features are widened to f64 at the boundary; labels stay 0/1, with 1 as
/// the positive class whose probability `predict_proba` reports.
pub struct LogisticClassifier {
    model: Option<FittedLogisticRegression<f64, usize>>,
    params: LogisticParams,
}

impl LogisticClassifier {
    pub fn new(params: LogisticParams) -> Self {
        LogisticClassifier {
            model: None,
            params,
        }
    }
}

/// On-disk snapshot of the learned parameters.
#[derive(Serialize)]
struct LogisticSnapshot<'a> {
    model: &'a str,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        if x.nrows() != y.len() {
            return Err(PipelineError::Data(format!(
                "Feature matrix has {} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let records = x.mapv(|v| v as f64);
        let targets: Array1<usize> =
            Array1::from_vec(y.iter().map(|&v| usize::from(v == 1)).collect());
        let dataset = Dataset::new(records, targets);

        let model = LogisticRegression::default()
            .max_iterations(self.params.max_iterations)
            .alpha(self.params.l2_penalty)
            .gradient_tolerance(self.params.gradient_tolerance)
            .fit(&dataset)
            .map_err(|e| {
                PipelineError::Data(format!("Logistic regression failed to fit: {}", e))
            })?;
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::Data("logistic model has not been fitted".to_string())
        })?;
        let records = x.mapv(|v| v as f64);
        let probabilities = model.predict_probabilities(&records);
        Ok(probabilities.iter().map(|&p| p as f32).collect())
    }

    fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::Data("Cannot save an unfitted logistic model".to_string())
        })?;
        let snapshot = LogisticSnapshot {
            model: "logistic",
            intercept: model.intercept(),
            coefficients: model.params().to_vec(),
        };
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &snapshot).map_err(|e| {
            PipelineError::Data(format!("Failed to serialize logistic model: {}", e))
        })
    }

    fn name(&self) -> &str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn fits_and_separates_a_toy_dataset() {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                1.0, 0.0, 0.9, 0.1, 1.1, 0.0, 1.0, 0.2, 0.0, 1.0, 0.1, 0.9, 0.0, 1.1, 0.2, 1.0,
            ],
        )
        .expect("valid shape");
        let y = vec![1, 1, 1, 1, 0, 0, 0, 0];

        let mut classifier = LogisticClassifier::new(LogisticParams::default());
        classifier.fit(&x, &y).expect("fit");

        let probabilities = classifier.predict_proba(&x).expect("predict");
        assert_eq!(probabilities.len(), 8);
        assert!(
            probabilities[0] > probabilities[4],
            "claim row should score higher ({} vs {})",
            probabilities[0],
            probabilities[4]
        );

        let predicted = classifier.predict(&x).expect("predict labels");
        assert_eq!(predicted, y);
    }

    #[test]
    fn single_class_training_data_is_rejected() {
        let x = Array2::<f32>::zeros((4, 2));
        let y = vec![1, 1, 1, 1];
        let mut classifier = LogisticClassifier::new(LogisticParams::default());
        let err = classifier.fit(&x, &y).expect_err("expected error");
        assert!(matches!(err, PipelineError::Data(_)));
    }
}
