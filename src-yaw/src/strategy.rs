//! Search strategies over the bounded yaw space.
//!
//! The optimizer hands a [`SearchProblem`] (bounds, start point, energy
//! function, budget) to a [`SearchStrategy`] and gets back the best point it
//! found. Energies are minimized: the optimizer feeds `-total_power`, with
//! `+inf` for failed evaluations.

use std::fmt;
use std::time::{Duration, Instant};

use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use yawopt_de::{
    DEConfigBuilder, Init, Mutation, OptimizationRecorder, ParallelConfig, ParallelEvaluator,
    PatternSearchConfig, Strategy, differential_evolution, init_latin_hypercube, pattern_search,
};

use crate::bounds::YawBounds;
use crate::outcome::Termination;

/// One search over a bounded box
pub struct SearchProblem<'a> {
    pub bounds: &'a YawBounds,
    /// Starting point inside the bounds (zero yaw projected onto them)
    pub start: &'a [f64],
    /// Energy to minimize, `+inf` marks a failed evaluation
    pub objective: &'a (dyn Fn(&Array1<f64>) -> f64 + Sync),
    /// Evaluations the strategy may spend
    pub max_evaluations: Option<usize>,
    pub deadline: Option<Instant>,
    pub seed: Option<u64>,
    pub parallel: ParallelConfig,
}

impl SearchProblem<'_> {
    fn lower(&self) -> Array1<f64> {
        Array1::from(self.bounds.lower().to_vec())
    }

    fn upper(&self) -> Array1<f64> {
        Array1::from(self.bounds.upper().to_vec())
    }

    fn time_left(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Best point found by a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub x: Vec<f64>,
    pub energy: f64,
    pub evaluations: usize,
    pub iterations: usize,
    pub termination: Termination,
}

/// A derivative-free search the optimizer can delegate to
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Minimize `problem.objective`; every evaluated point must lie inside the bounds
    fn search(&self, problem: &SearchProblem<'_>) -> SearchReport;
}

/// Strategy selector used by configuration and the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Differential evolution with pattern-search polishing
    #[default]
    DifferentialEvolution,
    /// Pattern search from zero yaw and Latin-hypercube starting points
    PatternSearch,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::DifferentialEvolution => "differential-evolution",
            StrategyKind::PatternSearch => "pattern-search",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Differential evolution seeded with the start point, then polished
#[derive(Debug, Clone)]
pub struct DifferentialEvolutionSearch {
    pub strategy: Strategy,
    /// Population multiplier per free turbine
    pub popsize: usize,
    pub maxiter: usize,
    pub tol: f64,
    pub atol: f64,
    pub mutation: Mutation,
    pub recombination: f64,
    pub init: Init,
    pub polish: Option<PatternSearchConfig>,
    recorder: Option<OptimizationRecorder>,
}

impl Default for DifferentialEvolutionSearch {
    fn default() -> Self {
        Self {
            strategy: Strategy::CurrentToBest1Bin,
            popsize: 15,
            maxiter: 200,
            tol: 1e-3,
            atol: 0.0,
            mutation: Mutation::Range { min: 0.5, max: 1.0 },
            recombination: 0.7,
            init: Init::LatinHypercube,
            polish: Some(PatternSearchConfig { initial_step: 0.05, min_step: 1e-4, maxeval: 500 }),
            recorder: None,
        }
    }
}

impl DifferentialEvolutionSearch {
    /// Record every generation into `recorder`
    pub fn with_recorder(mut self, recorder: OptimizationRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn recorder(&self) -> Option<&OptimizationRecorder> {
        self.recorder.as_ref()
    }
}

impl SearchStrategy for DifferentialEvolutionSearch {
    fn name(&self) -> &str {
        StrategyKind::DifferentialEvolution.as_str()
    }

    fn search(&self, problem: &SearchProblem<'_>) -> SearchReport {
        let mut builder = DEConfigBuilder::new()
            .maxiter(self.maxiter)
            .popsize(self.popsize)
            .tol(self.tol)
            .atol(self.atol)
            .mutation(self.mutation)
            .recombination(self.recombination)
            .strategy(self.strategy)
            .init(self.init)
            .x0(Array1::from(problem.start.to_vec()))
            .parallel(problem.parallel);
        if let Some(seed) = problem.seed {
            builder = builder.seed(seed);
        }
        if let Some(budget) = problem.max_evaluations {
            builder = builder.maxfev(budget);
        }
        if let Some(left) = problem.time_left() {
            builder = builder.time_limit(left);
        }
        if let Some(polish) = &self.polish {
            builder = builder.polish(polish.clone());
        }
        if let Some(recorder) = &self.recorder {
            builder = builder.callback(recorder.create_callback());
        }

        let report = differential_evolution(&problem.objective, &problem.bounds.pairs(), builder.build());
        log::debug!("DE search: {} ({} generations, {} evaluations)", report.message, report.nit, report.nfev);

        SearchReport {
            x: report.x.to_vec(),
            energy: report.fun,
            evaluations: report.nfev,
            iterations: report.nit,
            termination: report.termination.into(),
        }
    }
}

/// Bounded pattern search restarted from several points
///
/// The first start is the problem's start point, the others are drawn by
/// Latin hypercube sampling with the problem seed. The evaluation budget is
/// split evenly between starts; the best end point wins, earliest start on ties.
#[derive(Debug, Clone)]
pub struct MultiStartPatternSearch {
    pub starts: usize,
    pub pattern: PatternSearchConfig,
}

impl Default for MultiStartPatternSearch {
    fn default() -> Self {
        Self {
            starts: 8,
            pattern: PatternSearchConfig { initial_step: 0.25, min_step: 1e-4, maxeval: 1_000 },
        }
    }
}

impl SearchStrategy for MultiStartPatternSearch {
    fn name(&self) -> &str {
        StrategyKind::PatternSearch.as_str()
    }

    fn search(&self, problem: &SearchProblem<'_>) -> SearchReport {
        let func = &problem.objective;
        let n = problem.bounds.len();
        let lower = problem.lower();
        let upper = problem.upper();
        let evaluator = ParallelEvaluator::new(&problem.parallel);

        if problem.bounds.is_fixed() {
            let x = Array1::from(problem.start.to_vec());
            return SearchReport {
                energy: func(&x),
                x: x.to_vec(),
                evaluations: 1,
                iterations: 0,
                termination: Termination::BoundsExhausted,
            };
        }

        let total = problem
            .max_evaluations
            .unwrap_or(self.starts.max(1) * (self.pattern.maxeval + 1));
        let starts = self.starts.min(total / 2).max(1);

        let mut points = vec![Array1::from(problem.start.to_vec())];
        if starts > 1 {
            let mut rng = match problem.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            let is_free: Vec<bool> = (0..n).map(|j| upper[j] > lower[j]).collect();
            let sampled = init_latin_hypercube(n, starts - 1, &lower, &upper, &is_free, &mut rng);
            points.extend(sampled.outer_iter().map(|row| row.to_owned()));
        }

        let start_energies = evaluator.evaluate_all(&points, func);
        let mut evaluations = points.len();
        let per_start = total.saturating_sub(evaluations) / starts;

        let mut best: Option<(Array1<f64>, f64)> = None;
        let mut polls = 0;
        let mut all_converged = true;
        for (k, (point, &f0)) in points.iter().zip(start_energies.iter()).enumerate() {
            if problem.deadline_passed() {
                all_converged = false;
                break;
            }
            let report = pattern_search(
                func,
                point,
                f0,
                &lower,
                &upper,
                &self.pattern,
                Some(per_start),
                problem.deadline,
                &evaluator,
            );
            log::debug!(
                "pattern search start {}: {:.6e} -> {:.6e} ({} polls)",
                k,
                f0,
                report.fun,
                report.polls
            );
            evaluations += report.nfev;
            polls += report.polls;
            all_converged &= report.converged;
            if best.as_ref().is_none_or(|(_, f)| report.fun < *f) {
                best = Some((report.x, report.fun));
            }
        }

        let termination = if all_converged {
            Termination::Converged
        } else if problem.deadline_passed() {
            Termination::TimeLimit
        } else {
            Termination::BudgetExhausted
        };
        let (x, energy) = best.unwrap_or_else(|| (points[0].clone(), start_energies[0]));

        SearchReport { x: x.to_vec(), energy, evaluations, iterations: polls, termination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // separable bowl with its minimum at (5, 12.5, 20), inside [0, 25]^3
    fn bowl(x: &Array1<f64>) -> f64 {
        (x[0] - 5.0).powi(2) + (x[1] - 12.5).powi(2) + (x[2] - 20.0).powi(2)
    }

    fn problem<'a>(
        bounds: &'a YawBounds,
        start: &'a [f64],
        objective: &'a (dyn Fn(&Array1<f64>) -> f64 + Sync),
        budget: Option<usize>,
    ) -> SearchProblem<'a> {
        SearchProblem {
            bounds,
            start,
            objective,
            max_evaluations: budget,
            deadline: None,
            seed: Some(11),
            parallel: ParallelConfig { enabled: false, num_threads: None },
        }
    }

    #[test]
    fn test_differential_evolution_finds_bowl_minimum() {
        let bounds = YawBounds::uniform(0.0, 25.0, 3).unwrap();
        let start = [0.0; 3];
        let report = DifferentialEvolutionSearch::default().search(&problem(&bounds, &start, &bowl, None));
        assert!(report.energy < 1e-4, "energy {}", report.energy);
        assert!(bounds.contains(&report.x));
    }

    #[test]
    fn test_pattern_search_finds_bowl_minimum() {
        let bounds = YawBounds::uniform(0.0, 25.0, 3).unwrap();
        let start = [0.0; 3];
        let report = MultiStartPatternSearch::default().search(&problem(&bounds, &start, &bowl, None));
        assert!(report.energy < 1e-4, "energy {}", report.energy);
        assert_eq!(report.termination, Termination::Converged);
    }

    #[test]
    fn test_pattern_search_respects_budget() {
        let calls = AtomicUsize::new(0);
        let counted = |x: &Array1<f64>| {
            calls.fetch_add(1, Ordering::Relaxed);
            bowl(x)
        };
        let bounds = YawBounds::uniform(0.0, 25.0, 3).unwrap();
        let start = [0.0; 3];
        let report = MultiStartPatternSearch::default().search(&problem(&bounds, &start, &counted, Some(60)));
        assert!(report.evaluations <= 60);
        assert_eq!(report.evaluations, calls.load(Ordering::Relaxed));
        assert_eq!(report.termination, Termination::BudgetExhausted);
    }

    #[test]
    fn test_flat_objective_keeps_the_first_start() {
        let flat = |_: &Array1<f64>| 1.0;
        let bounds = YawBounds::uniform(0.0, 25.0, 2).unwrap();
        let start = [0.0; 2];
        let report = MultiStartPatternSearch::default().search(&problem(&bounds, &start, &flat, Some(200)));
        assert_eq!(report.x, vec![0.0, 0.0]);
    }

    #[test]
    fn test_fixed_bounds_evaluate_once() {
        let bounds = YawBounds::uniform(4.0, 4.0, 3).unwrap();
        let start = [4.0; 3];
        for strategy in [
            &DifferentialEvolutionSearch::default() as &dyn SearchStrategy,
            &MultiStartPatternSearch::default(),
        ] {
            let report = strategy.search(&problem(&bounds, &start, &bowl, None));
            assert_eq!(report.x, vec![4.0, 4.0, 4.0]);
            assert_eq!(report.energy, bowl(&Array1::from(vec![4.0; 3])));
            assert_eq!(report.evaluations, 1);
            assert_eq!(report.termination, Termination::BoundsExhausted);
        }
    }

    #[test]
    fn test_recorder_sees_every_generation() {
        let recorder = OptimizationRecorder::new("bowl");
        let search = DifferentialEvolutionSearch { maxiter: 5, polish: None, tol: 0.0, ..Default::default() }
            .with_recorder(recorder.clone());
        let bounds = YawBounds::uniform(0.0, 25.0, 3).unwrap();
        let start = [0.0; 3];
        let report = search.search(&problem(&bounds, &start, &bowl, None));
        assert_eq!(report.iterations, 5);
        assert_eq!(recorder.num_iterations(), 5);
        assert_eq!(search.recorder().map(|r| r.name()), Some("bowl"));
    }

    #[test]
    fn test_strategy_kind_names() {
        assert_eq!(StrategyKind::default().to_string(), "differential-evolution");
        let json = serde_json::to_string(&StrategyKind::PatternSearch).unwrap();
        assert_eq!(json, "\"pattern-search\"");
    }
}
