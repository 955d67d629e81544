use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use yawopt_de::{Mutation, ParallelConfig, PatternSearchConfig, Strategy};

use crate::bounds::YawBounds;
use crate::error::YawError;
use crate::strategy::{DifferentialEvolutionSearch, MultiStartPatternSearch, SearchStrategy, StrategyKind};

/// Smallest usable evaluation budget: baseline, final re-evaluation, the
/// start point and a minimal population.
pub const MIN_EVALUATIONS: usize = 3 + yawopt_de::MIN_POPULATION;

/// Invalid optimizer settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_evaluations must be at least {min}, got {got}")]
    BudgetTooSmall { min: usize, got: usize },

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("tolerance must be finite and non-negative, got {0}")]
    Tolerance(f64),

    #[error("recombination must lie in [0, 1], got {0}")]
    Recombination(f64),

    #[error("mutation range must satisfy 0 < min <= max <= 2, got [{min}, {max}]")]
    Mutation { min: f64, max: f64 },

    #[error("time limit must be a positive, representable duration, got {0} s")]
    TimeLimit(f64),

    #[error("{0}")]
    UnknownStrategy(String),

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for [`crate::YawOptimizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Lower yaw bound in degrees, shared by all turbines
    pub min_yaw: f64,
    /// Upper yaw bound in degrees, shared by all turbines
    pub max_yaw: f64,
    pub strategy: StrategyKind,
    /// Differential evolution scheme, e.g. `currenttobest1bin`
    pub de_strategy: String,
    /// Population multiplier per free turbine
    pub popsize: usize,
    pub maxiter: usize,
    /// Relative convergence tolerance on the population energies
    pub tolerance: f64,
    /// Dithered mutation range `[min, max]`
    pub mutation: (f64, f64),
    pub recombination: f64,
    /// Refine the differential evolution result with pattern search
    pub polish: bool,
    /// Number of starting points for the pattern-search strategy
    pub starts: usize,
    /// Flow-field evaluations allowed, baseline included
    pub max_evaluations: Option<usize>,
    /// Wall-clock limit in seconds
    pub time_limit_secs: Option<f64>,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub num_threads: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_yaw: 0.0,
            max_yaw: 25.0,
            strategy: StrategyKind::DifferentialEvolution,
            de_strategy: "currenttobest1bin".to_string(),
            popsize: 15,
            maxiter: 200,
            tolerance: 1e-3,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            polish: true,
            starts: 8,
            max_evaluations: None,
            time_limit_secs: None,
            seed: None,
            parallel: true,
            num_threads: None,
        }
    }
}

impl OptimizerConfig {
    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder::new()
    }

    /// Check every setting, bounds included
    pub fn validate(&self) -> Result<(), YawError> {
        YawBounds::uniform(self.min_yaw, self.max_yaw, 1)?;
        self.de_strategy()?;
        if self.popsize == 0 {
            return Err(ConfigError::ZeroCount { name: "popsize" }.into());
        }
        if self.maxiter == 0 {
            return Err(ConfigError::ZeroCount { name: "maxiter" }.into());
        }
        if self.starts == 0 {
            return Err(ConfigError::ZeroCount { name: "starts" }.into());
        }
        if self.num_threads == Some(0) {
            return Err(ConfigError::ZeroCount { name: "num_threads" }.into());
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Tolerance(self.tolerance).into());
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(ConfigError::Recombination(self.recombination).into());
        }
        let (min, max) = self.mutation;
        if !(min > 0.0 && min <= max && max <= 2.0) {
            return Err(ConfigError::Mutation { min, max }.into());
        }
        if let Some(budget) = self.max_evaluations {
            if budget < MIN_EVALUATIONS {
                return Err(ConfigError::BudgetTooSmall { min: MIN_EVALUATIONS, got: budget }.into());
            }
        }
        if let Some(secs) = self.time_limit_secs {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::TimeLimit(secs).into());
            }
        }
        Ok(())
    }

    pub fn de_strategy(&self) -> Result<Strategy, ConfigError> {
        self.de_strategy.parse::<Strategy>().map_err(ConfigError::UnknownStrategy)
    }

    /// The shared yaw bounds for a farm of `n` turbines
    pub fn bounds_for(&self, n: usize) -> Result<YawBounds, YawError> {
        YawBounds::uniform(self.min_yaw, self.max_yaw, n)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig { enabled: self.parallel, num_threads: self.num_threads }
    }

    /// The differential evolution search these settings describe
    pub fn differential_evolution(&self) -> Result<DifferentialEvolutionSearch, ConfigError> {
        let (min, max) = self.mutation;
        let mut search = DifferentialEvolutionSearch::default();
        search.strategy = self.de_strategy()?;
        search.popsize = self.popsize;
        search.maxiter = self.maxiter;
        search.tol = self.tolerance;
        search.mutation =
            if min == max { Mutation::Factor(min) } else { Mutation::Range { min, max } };
        search.recombination = self.recombination;
        if !self.polish {
            search.polish = None;
        }
        Ok(search)
    }

    /// The multi-start pattern search these settings describe
    pub fn pattern_search(&self) -> MultiStartPatternSearch {
        let default = MultiStartPatternSearch::default();
        let min_step = (self.tolerance * 0.1).clamp(1e-8, default.pattern.min_step);
        MultiStartPatternSearch {
            starts: self.starts,
            pattern: PatternSearchConfig { min_step, ..default.pattern },
        }
    }

    pub fn build_strategy(&self) -> Result<Box<dyn SearchStrategy>, ConfigError> {
        Ok(match self.strategy {
            StrategyKind::DifferentialEvolution => Box::new(self.differential_evolution()?),
            StrategyKind::PatternSearch => Box::new(self.pattern_search()),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Load settings from a JSON file; missing keys take their default values
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

/// Fluent builder for [`OptimizerConfig`]
#[derive(Debug, Default)]
pub struct OptimizerConfigBuilder {
    cfg: OptimizerConfig,
}

impl OptimizerConfigBuilder {
    pub fn new() -> Self {
        Self { cfg: OptimizerConfig::default() }
    }
    pub fn bounds(mut self, min_yaw: f64, max_yaw: f64) -> Self {
        self.cfg.min_yaw = min_yaw;
        self.cfg.max_yaw = max_yaw;
        self
    }
    pub fn strategy(mut self, v: StrategyKind) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn de_strategy(mut self, v: impl Into<String>) -> Self {
        self.cfg.de_strategy = v.into();
        self
    }
    pub fn popsize(mut self, v: usize) -> Self {
        self.cfg.popsize = v;
        self
    }
    pub fn maxiter(mut self, v: usize) -> Self {
        self.cfg.maxiter = v;
        self
    }
    pub fn tolerance(mut self, v: f64) -> Self {
        self.cfg.tolerance = v;
        self
    }
    pub fn mutation(mut self, min: f64, max: f64) -> Self {
        self.cfg.mutation = (min, max);
        self
    }
    pub fn recombination(mut self, v: f64) -> Self {
        self.cfg.recombination = v;
        self
    }
    pub fn polish(mut self, v: bool) -> Self {
        self.cfg.polish = v;
        self
    }
    pub fn starts(mut self, v: usize) -> Self {
        self.cfg.starts = v;
        self
    }
    pub fn max_evaluations(mut self, v: usize) -> Self {
        self.cfg.max_evaluations = Some(v);
        self
    }
    pub fn time_limit(mut self, v: Duration) -> Self {
        self.cfg.time_limit_secs = Some(v.as_secs_f64());
        self
    }
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = Some(v);
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn num_threads(mut self, v: usize) -> Self {
        self.cfg.num_threads = Some(v);
        self
    }
    pub fn build(self) -> OptimizerConfig {
        self.cfg
    }
}
