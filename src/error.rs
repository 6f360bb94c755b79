use std::error::Error;
use std::fmt;

/// Error kinds surfaced by the pipeline.
///
/// No stage recovers locally: the first error aborts the run and reaches
/// the caller unchanged.
#[derive(Debug)]
pub enum PipelineError {
    /// Malformed or missing input data.
    Data(String),
    /// Unknown factory key or invalid hyperparameter.
    Config(String),
    /// Degenerate evaluation set, metrics undefined.
    Evaluation(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::Data(msg) => write!(f, "data error: {}", msg),
            PipelineError::Config(msg) => write!(f, "config error: {}", msg),
            PipelineError::Evaluation(msg) => write!(f, "evaluation error: {}", msg),
        }
    }
}

impl Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::Data(err.to_string())
    }
}
