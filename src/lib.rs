//! claimcast: a batch pipeline that trains a binary claim-risk classifier
//! on tabular insurance policy data.
//!
//! The crate wires CSV loading, preprocessing, feature scaling, training-set
//! rebalancing, model training and evaluation into one linear run. The heavy
//! lifting (boosting, logistic regression, plotting) is delegated to
//! ecosystem crates; the modules here select and connect them from
//! configuration.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod sampling;
pub mod scaling;
