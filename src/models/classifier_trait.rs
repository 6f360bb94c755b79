use std::path::Path;

use ndarray::Array2;

use crate::error::PipelineError;

/// Contract shared by every classifier in the registry. Implementations
/// wrap an external learning crate and translate labels and errors at the
/// boundary.
pub trait ClassifierModel {
    /// Fit the model. `y` holds 1 for claim and 0 for no-claim.
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError>;

    /// Predict claim probabilities in [0, 1], one per row.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError>;

    /// Predict hard labels at the default 0.5 threshold.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, PipelineError> {
        let probabilities = self.predict_proba(x)?;
        Ok(probabilities
            .iter()
            .map(|&p| i32::from(p >= 0.5))
            .collect())
    }

    /// Serialize the trained model to `path`.
    fn save(&self, path: &Path) -> Result<(), PipelineError>;

    /// Human readable name for the model.
    fn name(&self) -> &str {
        "classifier"
    }
}
