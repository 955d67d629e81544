use std::path::PathBuf;

use crate::config::ConfigError;

/// Failure of a single flow-field evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("yaw vector has {got} entries but the layout has {expected} turbines")]
    LengthMismatch { expected: usize, got: usize },

    #[error("flow-field model returned {got} turbine powers for {expected} turbines")]
    ResponseLength { expected: usize, got: usize },

    #[error("flow-field model returned invalid power {value} for turbine {turbine}")]
    InvalidPower { turbine: usize, value: f64 },

    #[error("flow-field model failed: {0}")]
    Model(String),
}

impl EvaluationError {
    /// Convenience constructor for model implementations
    pub fn model(msg: impl Into<String>) -> Self {
        EvaluationError::Model(msg.into())
    }
}

/// Errors returned by the optimizer and its inputs
#[derive(Debug, thiserror::Error)]
pub enum YawError {
    #[error("invalid yaw bounds for turbine {turbine}: min={min}, max={max}")]
    InvalidBounds { turbine: usize, min: f64, max: f64 },

    #[error("bounds have {lower} lower and {upper} upper limits")]
    MismatchedBounds { lower: usize, upper: usize },

    #[error("bounds cover {bounds} turbines but the layout has {turbines}")]
    BoundsLength { bounds: usize, turbines: usize },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("invalid wind condition: {0}")]
    InvalidWind(String),

    #[error("baseline evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("baseline power {0} is not positive, gain is undefined")]
    NonPositiveBaseline(f64),

    #[error("no candidate inside the bounds could be evaluated")]
    NoFeasibleCandidate,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YawError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        YawError::Io { path: path.into(), source }
    }
}
