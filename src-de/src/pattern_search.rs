//! Bounded compass (pattern) search.
//!
//! Derivative-free local refinement: poll `x ± step·e_j` along every free axis,
//! move to the best strictly improving poll point, halve the step otherwise.
//! Poll points are projected onto the box and each poll is evaluated as one batch.

use std::time::Instant;

use ndarray::Array1;

use crate::parallel_eval::ParallelEvaluator;
use crate::{argmin, sanitize};

/// Pattern search settings, steps are fractions of each variable's range
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSearchConfig {
    /// Initial step as a fraction of `upper - lower`
    pub initial_step: f64,
    /// The search stops once the step fraction falls below this value
    pub min_step: f64,
    /// Maximum number of evaluations for this search
    pub maxeval: usize,
}

impl Default for PatternSearchConfig {
    fn default() -> Self {
        Self { initial_step: 0.1, min_step: 1e-4, maxeval: 2_000 }
    }
}

/// Result of a pattern search
#[derive(Debug, Clone)]
pub struct PatternSearchReport {
    pub x: Array1<f64>,
    pub fun: f64,
    pub nfev: usize,
    /// Number of polls performed
    pub polls: usize,
    /// True when the step shrank below `min_step`, false when a budget stopped the search
    pub converged: bool,
}

/// Minimize `func` from `x0` (with known value `f0`) inside `[lower, upper]`.
///
/// `budget` caps evaluations on top of `config.maxeval`; `deadline` is checked
/// before every poll. The returned value never exceeds `f0`.
#[allow(clippy::too_many_arguments)]
pub fn pattern_search<F>(
    func: &F,
    x0: &Array1<f64>,
    f0: f64,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    config: &PatternSearchConfig,
    budget: Option<usize>,
    deadline: Option<Instant>,
    evaluator: &ParallelEvaluator,
) -> PatternSearchReport
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    let n = x0.len();
    let span: Vec<f64> = (0..n).map(|j| upper[j] - lower[j]).collect();
    let free: Vec<usize> = (0..n).filter(|&j| span[j] > 0.0).collect();
    let maxeval = budget.map_or(config.maxeval, |b| b.min(config.maxeval));

    let mut x = x0.clone();
    let mut f = sanitize(f0);
    let mut frac = config.initial_step;
    let mut nfev = 0usize;
    let mut polls = 0usize;
    let mut converged = free.is_empty();

    while !converged {
        if frac < config.min_step {
            converged = true;
            break;
        }
        let left = maxeval.saturating_sub(nfev);
        if left == 0 || deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let mut candidates: Vec<Array1<f64>> = Vec::with_capacity(2 * free.len());
        for &j in &free {
            for dir in [1.0, -1.0] {
                let moved = (x[j] + dir * frac * span[j]).clamp(lower[j], upper[j]);
                if moved != x[j] {
                    let mut c = x.clone();
                    c[j] = moved;
                    candidates.push(c);
                }
            }
        }
        // every move is blocked by a bound at this step size
        if candidates.is_empty() {
            frac *= 0.5;
            continue;
        }
        candidates.truncate(left);

        let values = evaluator.evaluate_all(&candidates, func);
        nfev += candidates.len();
        polls += 1;

        let (best_i, best_f) = argmin(&values);
        if best_f < f {
            f = best_f;
            x = candidates.swap_remove(best_i);
        } else {
            frac *= 0.5;
        }
    }

    PatternSearchReport { x, fun: f, nfev, polls, converged }
}
