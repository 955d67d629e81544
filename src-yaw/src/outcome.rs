use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bounds::YawVector;
use crate::error::YawError;
use crate::evaluator::PowerResult;

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Improvement fell below the tolerance
    Converged,
    /// The evaluation budget ran out
    BudgetExhausted,
    /// The wall-clock limit was reached, best-so-far returned
    TimeLimit,
    /// The iteration cap was reached
    IterationLimit,
    /// A callback asked the search to stop
    Stopped,
    /// Every turbine is pinned by its bounds, nothing left to search
    BoundsExhausted,
}

impl Termination {
    /// Whether a resource limit ended the run
    pub fn is_budget_exhausted(self) -> bool {
        matches!(
            self,
            Termination::BudgetExhausted | Termination::TimeLimit | Termination::IterationLimit
        )
    }
}

impl From<yawopt_de::Termination> for Termination {
    fn from(t: yawopt_de::Termination) -> Self {
        match t {
            yawopt_de::Termination::Converged => Termination::Converged,
            yawopt_de::Termination::MaxIterations => Termination::IterationLimit,
            yawopt_de::Termination::MaxEvaluations => Termination::BudgetExhausted,
            yawopt_de::Termination::TimeLimit => Termination::TimeLimit,
            yawopt_de::Termination::Callback => Termination::Stopped,
            yawopt_de::Termination::AllFixed => Termination::BoundsExhausted,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Converged => "converged",
            Termination::BudgetExhausted => "evaluation budget exhausted",
            Termination::TimeLimit => "time limit reached",
            Termination::IterationLimit => "iteration limit reached",
            Termination::Stopped => "stopped",
            Termination::BoundsExhausted => "bounds exhausted",
        };
        f.write_str(s)
    }
}

/// Conditions worth surfacing to the caller without failing the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeFlag {
    /// Baseline power is zero or negative, the gain is undefined
    NonPositiveBaseline,
    /// Every evaluation after the baseline failed
    AllCandidatesFailed,
    /// Zero yaw lies outside the bounds, so the baseline is only a reference
    BaselineOutsideBounds,
}

/// How the outcome was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Search strategy name
    pub strategy: String,
    pub termination: Termination,
    /// All flow-field evaluations, baseline included
    pub evaluations: usize,
    pub failed_evaluations: usize,
    /// Generations or polls performed by the strategy
    pub iterations: usize,
    pub seed: Option<u64>,
    /// True when the returned yaw vector beat the baseline
    pub improved: bool,
    pub flags: Vec<OutcomeFlag>,
}

impl RunMetadata {
    pub fn has_flag(&self, flag: OutcomeFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Result of one optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Best yaw vector found, inside the bounds
    pub yaw: YawVector,
    /// Power at `yaw`
    pub optimized: PowerResult,
    /// Power at zero yaw
    pub baseline: PowerResult,
    /// `100 * (optimized - baseline) / baseline`, `None` when the baseline is not positive
    pub gain_percent: Option<f64>,
    pub metadata: RunMetadata,
}

/// Percentage gain, undefined for a non-positive baseline
pub fn gain_percent(baseline: f64, optimized: f64) -> Option<f64> {
    if baseline > 0.0 && baseline.is_finite() {
        Some(100.0 * (optimized - baseline) / baseline)
    } else {
        None
    }
}

impl OptimizationOutcome {
    /// The percentage gain, or `NonPositiveBaseline` when it is undefined
    pub fn gain(&self) -> Result<f64, YawError> {
        self.gain_percent.ok_or(YawError::NonPositiveBaseline(self.baseline.total))
    }

    /// Absolute power gained over the baseline (W)
    pub fn power_gain(&self) -> f64 {
        self.optimized.total - self.baseline.total
    }

    pub fn to_json_string(&self) -> Result<String, YawError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, YawError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), YawError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| YawError::io(path, e))
    }

    pub fn load_json(path: &Path) -> Result<Self, YawError> {
        let content = std::fs::read_to_string(path).map_err(|e| YawError::io(path, e))?;
        Self::from_json_str(&content)
    }
}
