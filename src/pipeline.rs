//! End-to-end training pipeline.
//!
//! Stages run strictly in sequence: load, split, preprocess, scale,
//! rebalance, train, evaluate, persist. There is no retry and no partial
//! recovery; the first failure aborts the run and surfaces the originating
//! error unchanged.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::{ModelType, PipelineConfig};
use crate::data_handling;
use crate::error::PipelineError;
use crate::evaluation::{EvaluationReport, ModelEvaluator};
use crate::models::factory;
use crate::preprocessing::Preprocessor;
use crate::report;
use crate::sampling::{Sampler, SamplingStrategy};
use crate::scaling::{Scaler, ScalerKind};

/// Artifacts produced by a completed run.
#[derive(Debug)]
pub struct RunArtifacts {
    pub report: EvaluationReport,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
    pub metrics_path: PathBuf,
}

/// Run the full pipeline described by `config`.
///
/// Every configured name (scaler, sampling strategy, model) is resolved
/// before any data is read or file written, so a config error performs no
/// side effects.
pub fn run(config: &PipelineConfig) -> Result<RunArtifacts, PipelineError> {
    let scaler_kind: ScalerKind = config.scaler.parse()?;
    let strategy: SamplingStrategy = config.sampling.parse()?;
    let model_type = ModelType::from_config(&config.model, &config.hyperparams)?;

    let table = data_handling::load_csv(&config.data_path)?;
    log::info!(
        "Loaded {} policy records from {}",
        table.nrows(),
        config.data_path
    );

    let (train_raw, test_raw) = data_handling::split_train_test(
        &table,
        &config.target_column,
        config.test_size,
        config.random_state,
    )?;
    log::info!(
        "Split into {} training and {} held-out rows",
        train_raw.nrows(),
        test_raw.nrows()
    );

    let mut preprocessor = Preprocessor::new(config.features.clone(), &config.target_column);
    let mut train = preprocessor.fit_transform(&train_raw)?;
    let mut test = preprocessor.transform(&test_raw)?;
    train.log_summary("Training split");

    let mut scaler = Scaler::new(scaler_kind);
    train.x = scaler.fit_transform(&train.x)?;
    test.x = scaler.transform(&test.x)?;
    log::info!("Scaled features with the {} scaler", config.scaler);

    let sampler = Sampler::new(strategy, config.random_state);
    let train = sampler.resample(&train)?;
    train.log_summary("Training split after resampling");

    let mut model = factory::build_model(&model_type);
    log::info!(
        "Training {} model on {} rows x {} features",
        model.name(),
        train.n_samples(),
        train.n_features()
    );
    let y_train = train.y.to_vec();
    model.fit(&train.x, &y_train)?;

    let evaluator = ModelEvaluator::new(config.output_dir.clone());
    let report = evaluator.evaluate(model.as_ref(), &test)?;

    let model_path = PathBuf::from(&config.output_dir).join(&config.model_file);
    model.save(&model_path)?;
    log::info!("Serialized trained model to {}", model_path.display());

    let metrics_path = PathBuf::from(&config.output_dir).join("metrics.json");
    let file = File::create(&metrics_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .map_err(|e| PipelineError::Data(format!("Failed to write metrics: {}", e)))?;

    let report_path = report::write_run_report(&report, Path::new(&config.output_dir))?;
    log::info!("Wrote run report to {}", report_path.display());

    Ok(RunArtifacts {
        report,
        model_path,
        report_path,
        metrics_path,
    })
}
