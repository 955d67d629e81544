//! Common command-line interface definitions shared across binaries

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{ConfigError, OptimizerConfig};
use crate::error::YawError;
use crate::strategy::StrategyKind;

fn parse_nonnegative_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(format!("{} is not a finite non-negative number", s))
    }
}

fn parse_time_limit(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{}", e))?;
    match Duration::try_from_secs_f64(v) {
        Ok(_) if v > 0.0 => Ok(v),
        _ => Err(format!("{} is not a positive number of seconds", s)),
    }
}

/// Shared CLI arguments for yawopt binaries.
#[derive(Parser, Debug, Clone)]
#[command(author, about, long_about = None)]
pub struct Args {
    /// Path to a farm description JSON file (farm.name, farm.description,
    /// farm.properties.{wind_direction, wind_speed, layout_x, layout_y}).
    /// If not provided, the built-in 3x4 grid is used.
    #[arg(short, long)]
    pub farm: Option<PathBuf>,

    /// Path to an optimizer config JSON file. When given, the tuning flags below are ignored.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lower yaw bound in degrees, applied to every turbine.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub min_yaw: f64,

    /// Upper yaw bound in degrees, applied to every turbine.
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    pub max_yaw: f64,

    /// Search strategy.
    #[arg(long, value_enum, default_value_t = StrategyKind::DifferentialEvolution)]
    pub strategy: StrategyKind,

    /// Differential evolution scheme (best1bin, rand1exp, currenttobest1bin, ...).
    #[arg(long, default_value = "currenttobest1bin")]
    pub de_strategy: String,

    /// Population multiplier per free turbine for differential evolution.
    #[arg(long, default_value_t = 15)]
    pub popsize: usize,

    /// Maximum number of differential evolution generations.
    #[arg(long, default_value_t = 200)]
    pub maxiter: usize,

    /// Relative convergence tolerance.
    #[arg(long, default_value_t = 1e-3, value_parser = parse_nonnegative_f64)]
    pub tolerance: f64,

    /// Number of starting points for the pattern-search strategy.
    #[arg(long, default_value_t = 8)]
    pub starts: usize,

    /// Maximum number of flow-field evaluations, baseline included.
    #[arg(long)]
    pub max_evaluations: Option<usize>,

    /// Wall-clock limit in seconds; the best result so far is returned.
    #[arg(long, value_parser = parse_time_limit)]
    pub time_limit: Option<f64>,

    /// Random seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the pattern-search polish after differential evolution.
    #[arg(long, default_value_t = false)]
    pub no_polish: bool,

    /// Evaluate candidates on the calling thread only.
    #[arg(long, default_value_t = false)]
    pub no_parallel: bool,

    /// Number of worker threads (default: one per core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write the outcome as JSON to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the plain-text report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Record every differential evolution generation to a CSV file under
    /// $YAWOPT_DIR/data_generated/records.
    #[arg(long, default_value_t = false)]
    pub record: bool,
}

impl Args {
    /// Optimizer settings from `--config` or, without it, from the flags
    pub fn to_config(&self) -> Result<OptimizerConfig, YawError> {
        let config = match &self.config {
            Some(path) => OptimizerConfig::from_json_file(path)?,
            None => {
                let mut builder = OptimizerConfig::builder()
                    .bounds(self.min_yaw, self.max_yaw)
                    .strategy(self.strategy)
                    .de_strategy(self.de_strategy.clone())
                    .popsize(self.popsize)
                    .maxiter(self.maxiter)
                    .tolerance(self.tolerance)
                    .starts(self.starts)
                    .polish(!self.no_polish)
                    .parallel(!self.no_parallel);
                if let Some(budget) = self.max_evaluations {
                    builder = builder.max_evaluations(budget);
                }
                if let Some(secs) = self.time_limit {
                    let limit = Duration::try_from_secs_f64(secs)
                        .map_err(|_| ConfigError::TimeLimit(secs))?;
                    builder = builder.time_limit(limit);
                }
                if let Some(seed) = self.seed {
                    builder = builder.seed(seed);
                }
                if let Some(threads) = self.threads {
                    builder = builder.num_threads(threads);
                }
                builder.build()
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let args = Args::parse_from(["yawopt-test"]);
        assert_eq!(args.min_yaw, 0.0);
        assert_eq!(args.max_yaw, 25.0);
        assert_eq!(args.strategy, StrategyKind::DifferentialEvolution);
        assert!(args.farm.is_none());
        assert!(!args.record);
        let config = args.to_config().unwrap();
        assert_eq!(config, OptimizerConfig::default());
    }

    #[test]
    fn negative_tolerance_rejected() {
        let res = Args::try_parse_from(["yawopt-test", "--tolerance", "-1"]);
        assert!(res.is_err());
    }

    #[test]
    fn zero_time_limit_rejected() {
        let res = Args::try_parse_from(["yawopt-test", "--time-limit", "0"]);
        assert!(res.is_err());
    }

    #[test]
    fn huge_time_limit_rejected() {
        assert!(Args::try_parse_from(["yawopt-test", "--time-limit", "1e30"]).is_err());
        let args = Args::parse_from(["yawopt-test", "--time-limit", "2.5"]);
        assert_eq!(args.to_config().unwrap().time_limit(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn flags_map_onto_config() {
        let args = Args::parse_from([
            "yawopt-test",
            "--min-yaw",
            "-5",
            "--max-yaw",
            "20",
            "--strategy",
            "pattern-search",
            "--seed",
            "9",
            "--max-evaluations",
            "500",
            "--no-parallel",
            "--no-polish",
        ]);
        let config = args.to_config().unwrap();
        assert_eq!((config.min_yaw, config.max_yaw), (-5.0, 20.0));
        assert_eq!(config.strategy, StrategyKind::PatternSearch);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_evaluations, Some(500));
        assert!(!config.parallel && !config.polish);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let args = Args::parse_from(["yawopt-test", "--min-yaw", "30"]);
        assert!(matches!(args.to_config(), Err(YawError::InvalidBounds { .. })));
    }

    #[test]
    fn unknown_de_strategy_rejected() {
        let args = Args::parse_from(["yawopt-test", "--de-strategy", "best2bin"]);
        assert!(matches!(args.to_config(), Err(YawError::Config(ConfigError::UnknownStrategy(_)))));
    }
}
