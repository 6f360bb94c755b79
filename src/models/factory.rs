use crate::config::ModelType;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GbdtClassifier;
use crate::models::logistic::LogisticClassifier;

/// Build a boxed classifier from a validated `ModelType`.
/// A thin factory implemented as a single function, so the registry of
/// model names lives next to the hyperparameter validation in `config`.
pub fn build_model(model_type: &ModelType) -> Box<dyn ClassifierModel> {
    match model_type {
        ModelType::Gbdt(params) => Box::new(GbdtClassifier::new(params.clone())),
        ModelType::Logistic(params) => Box::new(LogisticClassifier::new(params.clone())),
    }
}
