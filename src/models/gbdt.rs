use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array2, Axis};

use crate::config::GbdtParams;
use crate::error::PipelineError;
use crate::models::classifier_trait::ClassifierModel;

/// Gradient Boosting Decision Tree (GBDT) classifier.
///
/// The log-likelihood loss expects labels in {-1, 1}; the 0/1 claim labels
/// are mapped at this boundary and predictions come back as probabilities.
pub struct GbdtClassifier {
    model: Option<GBDT>,
    params: GbdtParams,
}

impl GbdtClassifier {
    pub fn new(params: GbdtParams) -> Self {
        GbdtClassifier {
            model: None,
            params,
        }
    }
}

impl ClassifierModel for GbdtClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), PipelineError> {
        if x.nrows() != y.len() {
            return Err(PipelineError::Data(format!(
                "Feature matrix has {} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level);
        config.set_loss(&self.params.loss_type);

        let mut gbdt = GBDT::new(&config);

        let mut train_x = DataVec::new();
        for (i, row) in x.axis_iter(Axis(0)).enumerate() {
            let label = if y[i] == 1 { 1.0 } else { -1.0 };
            train_x.push(Data::new_training_data(row.to_vec(), 1.0, label, None));
        }

        gbdt.fit(&mut train_x);
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::Data("gbdt model has not been fitted".to_string())
        })?;

        let mut test_x = DataVec::new();
        for row in x.axis_iter(Axis(0)) {
            test_x.push(Data::new_training_data(row.to_vec(), 1.0, 0.0, None));
        }

        let predictions = model.predict(&test_x);
        Ok(predictions.iter().map(|&p| p.clamp(0.0, 1.0)).collect())
    }

    fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::Data("Cannot save an unfitted gbdt model".to_string())
        })?;
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), model)
            .map_err(|e| PipelineError::Data(format!("Failed to serialize gbdt model: {}", e)))
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}
