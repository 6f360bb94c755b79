pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod logistic;
