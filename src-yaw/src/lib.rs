//! yawopt - wake-steering yaw optimization for wind farms
//!
//! Given turbine positions and an ambient wind condition, find per-turbine yaw
//! offsets that increase total farm power relative to the zero-yaw baseline.
//! The flow-field model is an external oracle behind [`FlowFieldModel`]; this
//! crate evaluates it, searches the bounded yaw space and reports the outcome.
//!
//! - `yawopt_de`: differential evolution and pattern search engine

pub use yawopt_de as de;

/// Per-turbine yaw bounds and yaw vectors
pub mod bounds;
/// Common CLI argument definitions shared across binaries
pub mod cli;
/// Optimizer configuration
pub mod config;
/// Error types
pub mod error;
/// Objective evaluator wrapping a flow-field model
pub mod evaluator;
/// Farm description files
pub mod farm;
/// Turbine layout and wind condition
pub mod model;
/// Bounded yaw optimizer
pub mod optimizer;
/// Optimization outcome and run metadata
pub mod outcome;
/// Plain-text outcome report
pub mod report;
/// Search strategies behind the optimizer
pub mod strategy;

pub use bounds::{YawBounds, YawVector};
pub use config::{ConfigError, OptimizerConfig, OptimizerConfigBuilder};
pub use error::{EvaluationError, YawError};
pub use evaluator::{FlowFieldModel, ObjectiveEvaluator, PowerResult};
pub use farm::FarmDescription;
pub use model::{Layout, Turbine, WindCondition};
pub use optimizer::{YawOptimizer, optimize_yaw};
pub use outcome::{OptimizationOutcome, OutcomeFlag, RunMetadata, Termination};
pub use report::OutcomeReport;
pub use strategy::{
    DifferentialEvolutionSearch, MultiStartPatternSearch, SearchProblem, SearchReport,
    SearchStrategy, StrategyKind,
};
