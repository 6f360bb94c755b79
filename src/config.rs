use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::PipelineError;

/// Which raw columns receive which preprocessing treatment.
///
/// The defaults mirror the historical policy schema this pipeline was built
/// for; a configuration file can swap in any other tabular layout.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct FeatureConfig {
    /// Identifier columns dropped before encoding.
    pub id_columns: Vec<String>,
    /// "Yes"/"No" columns mapped to 1/0 (missing cells count as "No").
    pub boolean_columns: Vec<String>,
    /// Numeric columns; unparseable cells are imputed with the training mean.
    pub float_columns: Vec<String>,
    /// Ordered categories encoded by their position in the configured order.
    pub ordinal_columns: Vec<OrdinalColumn>,
    /// Categorical columns one-hot encoded on the training vocabulary.
    pub categorical_columns: Vec<String>,
}

/// An ordinal column and its full ordered domain.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrdinalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            id_columns: vec!["policy_id".to_string()],
            boolean_columns: [
                "is_parking_camera",
                "is_tpms",
                "is_adjustable_steering",
                "is_esc",
                "is_parking_sensors",
                "is_front_fog_lights",
                "is_rear_window_wiper",
                "is_rear_window_washer",
                "is_rear_window_defogger",
                "is_brake_assist",
                "is_power_door_locks",
                "is_power_steering",
                "is_central_locking",
                "is_driver_seat_height_adjustable",
                "is_day_night_rear_view_mirror",
                "is_ecw",
                "is_speed_alert",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            float_columns: [
                "length",
                "width",
                "height",
                "gross_weight",
                "airbags",
                "population_density",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ordinal_columns: vec![OrdinalColumn {
                name: "ncap_rating".to_string(),
                categories: ["0", "1", "2", "3", "4", "5"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }],
            categorical_columns: [
                "transmission_type",
                "cylinder",
                "gear_box",
                "rear_brakes_type",
                "steering_type",
                "fuel_type",
                "make",
                "segment",
                "model",
                "engine_type",
                "max_torque",
                "max_power",
                "area_cluster",
                "displacement",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Gradient-boosted tree hyper-parameters.
///
/// Unknown keys are rejected at deserialization time so a typo in the
/// configuration fails the run instead of silently training with defaults.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct GbdtParams {
    pub learning_rate: f32,
    pub max_depth: u32,
    pub num_boost_round: usize,
    pub training_optimization_level: u8,
    pub loss_type: String,
    pub debug: bool,
}

impl Default for GbdtParams {
    fn default() -> Self {
        GbdtParams {
            learning_rate: 0.1,
            max_depth: 6,
            num_boost_round: 50,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
            debug: false,
        }
    }
}

/// Logistic-regression hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct LogisticParams {
    pub max_iterations: u64,
    pub l2_penalty: f64,
    pub gradient_tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        LogisticParams {
            max_iterations: 200,
            l2_penalty: 1.0,
            gradient_tolerance: 1e-4,
        }
    }
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    Gbdt(GbdtParams),
    Logistic(LogisticParams),
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Gbdt(GbdtParams::default())
    }
}

impl FromStr for ModelType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::Gbdt(GbdtParams::default())),
            "logistic" => Ok(ModelType::Logistic(LogisticParams::default())),
            _ => Err(PipelineError::Config(format!(
                "Unknown model type: '{}'. Available models: gbdt, logistic",
                s
            ))),
        }
    }
}

impl ModelType {
    /// Resolve a model name plus a hyper-parameter map, rejecting keys the
    /// chosen model does not accept.
    pub fn from_config(
        name: &str,
        hyperparams: &serde_json::Value,
    ) -> Result<Self, PipelineError> {
        if hyperparams.is_null() {
            return name.parse();
        }
        match name.to_lowercase().as_str() {
            "gbdt" => serde_json::from_value(hyperparams.clone())
                .map(ModelType::Gbdt)
                .map_err(|e| {
                    PipelineError::Config(format!("Invalid gbdt hyperparameters: {}", e))
                }),
            "logistic" => serde_json::from_value(hyperparams.clone())
                .map(ModelType::Logistic)
                .map_err(|e| {
                    PipelineError::Config(format!("Invalid logistic hyperparameters: {}", e))
                }),
            _ => Err(PipelineError::Config(format!(
                "Unknown model type: '{}'. Available models: gbdt, logistic",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Gbdt(_) => "gbdt",
            ModelType::Logistic(_) => "logistic",
        }
    }
}

/// Main pipeline configuration.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path of the policy CSV.
    pub data_path: String,
    pub target_column: String,
    /// Fraction of rows held out for evaluation, in (0, 1).
    pub test_size: f32,
    /// Seed driving the train/test split and the resampler.
    pub random_state: u64,
    /// Scaler name: none, standard, minmax or robust.
    pub scaler: String,
    /// Sampling strategy name: none, oversample or undersample.
    pub sampling: String,
    /// Model name: gbdt or logistic.
    pub model: String,
    /// Hyper-parameter overrides for the chosen model.
    pub hyperparams: serde_json::Value,
    /// Directory receiving plots, reports and the model artifact.
    pub output_dir: String,
    /// File name of the serialized model inside `output_dir`.
    pub model_file: String,
    pub features: FeatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_path: "data/train_data.csv".to_string(),
            target_column: "is_claim".to_string(),
            test_size: 0.2,
            random_state: 11,
            scaler: "standard".to_string(),
            sampling: "oversample".to_string(),
            model: "gbdt".to_string(),
            hyperparams: serde_json::Value::Null,
            output_dir: "output".to_string(),
            model_file: "claim_model.json".to_string(),
            features: FeatureConfig::default(),
        }
    }
}

/// Load a pipeline configuration from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, PipelineError> {
    let content = fs::read_to_string(&path).map_err(|e| {
        PipelineError::Config(format!(
            "Failed to read config {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        PipelineError::Config(format!(
            "Failed to parse config {}: {}",
            path.as_ref().display(),
            e
        ))
    })
}
