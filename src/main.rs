use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

use claimcast::config::{self, PipelineConfig};
use claimcast::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("CLAIMCAST_LOG", "info"),
    )
    .init();

    let matches = Command::new("claimcast")
        .version(clap::crate_version!())
        .about("Claimcast - claim-risk model training for insurance policy data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train and evaluate a claim classifier end to end")
                .arg(
                    Arg::new("config")
                        .help("Path to the pipeline configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the policy CSV. Overrides the data path \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output_dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory that plots, reports and the trained model \
                             will be written to. Overrides the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("scaler")
                        .long("scaler")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Feature scaler: none, standard, minmax or robust"),
                )
                .arg(
                    Arg::new("sampling")
                        .long("sampling")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Training-split rebalancing: none, oversample or undersample"),
                )
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Model to train: gbdt or logistic"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for the train/test split and the resampler"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_matches)) => run_train(sub_matches),
        _ => unreachable!("a subcommand is required"),
    }
}

fn run_train(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(data) = matches.get_one::<String>("data") {
        config.data_path = data.clone();
    }
    if let Some(output_dir) = matches.get_one::<String>("output_dir") {
        config.output_dir = output_dir.clone();
    }
    if let Some(scaler) = matches.get_one::<String>("scaler") {
        config.scaler = scaler.clone();
    }
    if let Some(sampling) = matches.get_one::<String>("sampling") {
        config.sampling = sampling.clone();
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.random_state = *seed;
    }

    let artifacts = pipeline::run(&config).context("Pipeline run failed")?;
    log::info!(
        "Run complete; model at {}, report at {}",
        artifacts.model_path.display(),
        artifacts.report_path.display()
    );
    Ok(())
}
