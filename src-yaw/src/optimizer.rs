//! Bounded yaw optimizer.
//!
//! One run goes `Init → BaselineEvaluated → Searching → Converged |
//! BudgetExhausted → Done`. The baseline is always zero yaw; a failing
//! baseline aborts the run, while failures during the search only make the
//! failing candidate unattractive.

use std::fmt;
use std::time::Instant;

use ndarray::Array1;

use crate::bounds::{YawBounds, YawVector};
use crate::config::OptimizerConfig;
use crate::error::YawError;
use crate::evaluator::{FlowFieldModel, ObjectiveEvaluator, PowerResult};
use crate::model::{Layout, WindCondition};
use crate::outcome::{OptimizationOutcome, OutcomeFlag, RunMetadata, gain_percent};
use crate::strategy::{SearchProblem, SearchStrategy};

#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    BaselineEvaluated,
    Searching,
    Converged,
    BudgetExhausted,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Maximizes total farm power over bounded per-turbine yaw angles
pub struct YawOptimizer {
    config: OptimizerConfig,
    strategy: Box<dyn SearchStrategy>,
}

impl fmt::Debug for YawOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YawOptimizer")
            .field("config", &self.config)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl YawOptimizer {
    /// Validate `config` and build the search strategy it selects
    pub fn new(config: OptimizerConfig) -> Result<Self, YawError> {
        config.validate()?;
        let strategy = config.build_strategy()?;
        Ok(Self { config, strategy })
    }

    /// Replace the configured search strategy
    pub fn with_strategy(mut self, strategy: impl SearchStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Optimize with the configured `[min_yaw, max_yaw]` applied to every turbine
    pub fn optimize_with_config_bounds(
        &self,
        model: &dyn FlowFieldModel,
        layout: &Layout,
        wind: &WindCondition,
    ) -> Result<OptimizationOutcome, YawError> {
        let bounds = self.config.bounds_for(layout.len())?;
        self.optimize(model, layout, wind, &bounds)
    }

    /// Search the yaw vector maximizing total power inside `bounds`.
    ///
    /// When zero yaw lies inside the bounds the returned power is never below
    /// the baseline: a candidate is only accepted if it strictly beats it.
    /// Otherwise the best feasible candidate is returned and the outcome is
    /// flagged with [`OutcomeFlag::BaselineOutsideBounds`].
    pub fn optimize(
        &self,
        model: &dyn FlowFieldModel,
        layout: &Layout,
        wind: &WindCondition,
        bounds: &YawBounds,
    ) -> Result<OptimizationOutcome, YawError> {
        let started = Instant::now();
        // a limit too far in the future to represent is no limit
        let deadline = self.config.time_limit().and_then(|d| started.checked_add(d));
        let n = layout.len();
        bounds.validate()?;
        if bounds.len() != n {
            return Err(YawError::BoundsLength { bounds: bounds.len(), turbines: n });
        }

        log_phase(Phase::Init);
        log::debug!(
            "{} turbines, wind {:.1} deg at {:.2} m/s, model '{}', strategy '{}'",
            n,
            wind.direction(),
            wind.speed(),
            model.name(),
            self.strategy.name()
        );

        let evaluator = ObjectiveEvaluator::new(model, layout, wind);
        let zero = YawVector::zeros(n);
        let baseline = evaluator.evaluate(zero.as_slice())?;
        log_phase(Phase::BaselineEvaluated);
        log::debug!("baseline power {:.3} W", baseline.total);

        let mut flags = Vec::new();
        if baseline.total <= 0.0 {
            log::warn!("baseline power {} is not positive, gain will be undefined", baseline.total);
            flags.push(OutcomeFlag::NonPositiveBaseline);
        }
        let zero_feasible = bounds.contains(zero.as_slice());
        if !zero_feasible {
            flags.push(OutcomeFlag::BaselineOutsideBounds);
        }

        let start = bounds.projected_zero();
        let objective = |x: &Array1<f64>| evaluator.energy(x);
        let problem = SearchProblem {
            bounds,
            start: start.as_slice(),
            objective: &objective,
            // baseline and the final re-evaluation come out of the same budget
            max_evaluations: self.config.max_evaluations.map(|m| m.saturating_sub(2)),
            deadline,
            seed: self.config.seed,
            parallel: self.config.parallel_config(),
        };

        log_phase(Phase::Searching);
        let report = self.strategy.search(&problem);
        log_phase(if report.termination.is_budget_exhausted() {
            Phase::BudgetExhausted
        } else {
            Phase::Converged
        });

        let search_evaluations = evaluator.evaluations() - 1;
        if search_evaluations > 0 && evaluator.failures() == search_evaluations {
            log::warn!("all {} candidate evaluations failed", search_evaluations);
            flags.push(OutcomeFlag::AllCandidatesFailed);
        }

        let mut candidate = report.x.clone();
        bounds.project(&mut candidate);
        let (yaw, optimized) = if zero_feasible {
            accept_if_better(&evaluator, candidate, report.energy, zero, &baseline)
        } else if report.energy.is_finite() {
            match evaluator.evaluate(&candidate) {
                Ok(power) => (YawVector::from(candidate), power),
                Err(_) => return Err(YawError::NoFeasibleCandidate),
            }
        } else {
            return Err(YawError::NoFeasibleCandidate);
        };

        let improved = optimized.total > baseline.total;
        let gain = gain_percent(baseline.total, optimized.total);
        let outcome = OptimizationOutcome {
            yaw,
            gain_percent: gain,
            metadata: RunMetadata {
                strategy: self.strategy.name().to_string(),
                termination: report.termination,
                evaluations: evaluator.evaluations(),
                failed_evaluations: evaluator.failures(),
                iterations: report.iterations,
                seed: self.config.seed,
                improved,
                flags,
            },
            optimized,
            baseline,
        };

        log_phase(Phase::Done);
        log::info!(
            "yaw optimization {}: {:.1} W -> {:.1} W, gain {}, {} evaluations in {:.2} s",
            outcome.metadata.termination,
            outcome.baseline.total,
            outcome.optimized.total,
            gain.map_or_else(|| "undefined".to_string(), |g| format!("{:.4} %", g)),
            outcome.metadata.evaluations,
            started.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }
}

fn log_phase(phase: Phase) {
    log::debug!("phase: {}", phase);
}

/// Keep the candidate only if re-evaluating it strictly beats the baseline
fn accept_if_better(
    evaluator: &ObjectiveEvaluator<'_>,
    candidate: Vec<f64>,
    energy: f64,
    zero: YawVector,
    baseline: &PowerResult,
) -> (YawVector, PowerResult) {
    if -energy <= baseline.total {
        return (zero, baseline.clone());
    }
    match evaluator.evaluate(&candidate) {
        Ok(power) if power.total > baseline.total => (YawVector::from(candidate), power),
        _ => (zero, baseline.clone()),
    }
}

/// Optimize with one `[min_yaw, max_yaw]` pair for all turbines and default settings
pub fn optimize_yaw(
    model: &dyn FlowFieldModel,
    layout: &Layout,
    wind: &WindCondition,
    min_yaw: f64,
    max_yaw: f64,
) -> Result<OptimizationOutcome, YawError> {
    let config = OptimizerConfig::builder().bounds(min_yaw, max_yaw).build();
    YawOptimizer::new(config)?.optimize_with_config_bounds(model, layout, wind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::outcome::Termination;
    use crate::strategy::SearchReport;
    use std::time::Duration;

    fn row(n: usize) -> Layout {
        let xs: Vec<f64> = (0..n).map(|i| 800.0 * i as f64).collect();
        Layout::from_xy(&xs, &vec![0.0; n]).unwrap()
    }

    fn wind() -> WindCondition {
        WindCondition::new(270.0, 8.0).unwrap()
    }

    fn concave(_: &Layout, _: &WindCondition, yaw: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        let peaks = [4.0, 11.0, 18.0];
        Ok(yaw.iter().zip(peaks).map(|(y, c)| 1.0e6 - 100.0 * (y - c).powi(2)).collect())
    }

    fn cosine(_: &Layout, _: &WindCondition, yaw: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        Ok(yaw.iter().map(|y| 2.0e6 * y.to_radians().cos().powf(1.88)).collect())
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig::builder().seed(5).parallel(false).build()
    }

    #[test]
    fn test_concave_farm_reaches_known_maximum() {
        let optimizer = YawOptimizer::new(config()).unwrap();
        let outcome = optimizer.optimize_with_config_bounds(&concave, &row(3), &wind()).unwrap();
        for (y, c) in outcome.yaw.as_slice().iter().zip([4.0, 11.0, 18.0]) {
            assert!((y - c).abs() < 1e-2, "yaw {} vs peak {}", y, c);
        }
        assert!(outcome.metadata.improved);
        assert!(outcome.gain().unwrap() > 0.0);
    }

    #[test]
    fn test_single_turbine_stays_at_zero() {
        let optimizer = YawOptimizer::new(config()).unwrap();
        let outcome = optimizer.optimize_with_config_bounds(&cosine, &row(1), &wind()).unwrap();
        assert_eq!(outcome.yaw.as_slice(), &[0.0]);
        assert_eq!(outcome.optimized, outcome.baseline);
        assert!(!outcome.metadata.improved);
        assert_eq!(outcome.gain().unwrap(), 0.0);
    }

    #[test]
    fn test_failing_baseline_is_an_error() {
        let broken = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Err(EvaluationError::model("no flow field"))
        };
        let optimizer = YawOptimizer::new(config()).unwrap();
        let err = optimizer.optimize_with_config_bounds(&broken, &row(2), &wind()).unwrap_err();
        assert!(matches!(err, YawError::Evaluation(EvaluationError::Model(_))));
    }

    #[test]
    fn test_bounds_must_match_layout() {
        let optimizer = YawOptimizer::new(config()).unwrap();
        let bounds = YawBounds::uniform(0.0, 25.0, 2).unwrap();
        let err = optimizer.optimize(&cosine, &row(3), &wind(), &bounds).unwrap_err();
        assert!(matches!(err, YawError::BoundsLength { bounds: 2, turbines: 3 }));
    }

    struct Overpromising;

    impl SearchStrategy for Overpromising {
        fn name(&self) -> &str {
            "overpromising"
        }

        fn search(&self, problem: &SearchProblem<'_>) -> SearchReport {
            SearchReport {
                x: problem.bounds.upper().to_vec(),
                energy: -1.0e12,
                evaluations: 0,
                iterations: 0,
                termination: Termination::Converged,
            }
        }
    }

    #[test]
    fn test_candidate_is_verified_against_the_baseline() {
        let optimizer = YawOptimizer::new(config()).unwrap().with_strategy(Overpromising);
        let outcome = optimizer.optimize_with_config_bounds(&cosine, &row(2), &wind()).unwrap();
        assert!(outcome.yaw.is_zero());
        assert_eq!(outcome.metadata.strategy, "overpromising");
        // baseline plus one re-evaluation of the claimed optimum
        assert_eq!(outcome.metadata.evaluations, 2);
    }

    #[test]
    fn test_budget_includes_baseline() {
        let cfg = OptimizerConfig::builder().seed(5).parallel(false).max_evaluations(40).build();
        let outcome = YawOptimizer::new(cfg)
            .unwrap()
            .optimize_with_config_bounds(&concave, &row(3), &wind())
            .unwrap();
        assert!(outcome.metadata.evaluations <= 40, "{}", outcome.metadata.evaluations);
        // the budget still buys whole generations after the initial population
        assert!(outcome.metadata.iterations > 0);
        assert!(outcome.metadata.termination.is_budget_exhausted());
        assert!(outcome.optimized.total >= outcome.baseline.total);
    }

    #[test]
    fn test_time_limit_returns_best_so_far() {
        let slow = |l: &Layout, w: &WindCondition, yaw: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            std::thread::sleep(Duration::from_millis(1));
            concave(l, w, yaw)
        };
        let cfg = OptimizerConfig::builder()
            .seed(5)
            .maxiter(100_000)
            .tolerance(0.0)
            .time_limit(Duration::from_millis(100))
            .build();
        let outcome = YawOptimizer::new(cfg)
            .unwrap()
            .optimize_with_config_bounds(&slow, &row(3), &wind())
            .unwrap();
        assert_eq!(outcome.metadata.termination, Termination::TimeLimit);
        assert!(outcome.optimized.total >= outcome.baseline.total);
    }

    #[test]
    fn test_deserialized_bounds_are_checked_before_the_run() {
        let optimizer = YawOptimizer::new(config()).unwrap();
        let valid: YawBounds = serde_json::from_str(r#"{"lower":[0,0,0],"upper":[25,25,25]}"#).unwrap();
        assert!(optimizer.optimize(&concave, &row(3), &wind(), &valid).is_ok());

        let inverted = serde_json::from_str::<YawBounds>(r#"{"lower":[10,10,10],"upper":[0,0,0]}"#);
        assert!(inverted.is_err());
        let err = YawBounds::per_turbine(&[(0.0, 25.0), (25.0, 0.0)]).unwrap_err();
        assert!(matches!(err, YawError::InvalidBounds { turbine: 1, .. }));
    }

    #[test]
    fn test_far_away_time_limit_means_no_limit() {
        let cfg = OptimizerConfig::from_json_str(r#"{"time_limit_secs": 1e18, "seed": 5, "parallel": false}"#)
            .unwrap();
        let outcome = YawOptimizer::new(cfg)
            .unwrap()
            .optimize_with_config_bounds(&concave, &row(3), &wind())
            .unwrap();
        assert_ne!(outcome.metadata.termination, Termination::TimeLimit);

        let huge = OptimizerConfig::from_json_str(r#"{"time_limit_secs": 1e30}"#).unwrap();
        assert!(matches!(
            YawOptimizer::new(huge),
            Err(YawError::Config(crate::config::ConfigError::TimeLimit(_)))
        ));
    }

    #[test]
    fn test_optimize_yaw_rejects_inverted_bounds() {
        let err = optimize_yaw(&cosine, &row(2), &wind(), 10.0, 0.0).unwrap_err();
        assert!(matches!(err, YawError::InvalidBounds { .. }));
    }
}
