//! Batch evaluation of candidate vectors, optionally on a rayon thread pool.
//!
//! Results always come back in candidate order, so selection after a parallel
//! batch is exactly the selection after a sequential one.

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::sanitize;

/// Parallel evaluation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Evaluate batches on worker threads
    pub enabled: bool,
    /// Worker count, `None` for one per available core
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, num_threads: None }
    }
}

/// Evaluates batches of candidates with the configured parallelism.
pub struct ParallelEvaluator {
    pool: Option<rayon::ThreadPool>,
}

impl ParallelEvaluator {
    /// Build an evaluator; falls back to sequential evaluation if the pool cannot be created.
    pub fn new(config: &ParallelConfig) -> Self {
        if !config.enabled {
            return Self { pool: None };
        }
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = config.num_threads {
            builder = builder.num_threads(n);
        }
        match builder.build() {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => {
                log::warn!("could not build evaluation thread pool ({}), evaluating sequentially", e);
                Self { pool: None }
            }
        }
    }

    /// Sequential evaluator
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Evaluate every row of `pop`.
    pub fn evaluate_rows<F>(&self, pop: &Array2<f64>, func: &F) -> Array1<f64>
    where
        F: Fn(&Array1<f64>) -> f64 + Sync,
    {
        let rows: Vec<Array1<f64>> = pop.outer_iter().map(|r| r.to_owned()).collect();
        self.evaluate_all(&rows, func)
    }

    /// Evaluate a batch of candidates; NaN results are reported as `+inf`.
    pub fn evaluate_all<F>(&self, candidates: &[Array1<f64>], func: &F) -> Array1<f64>
    where
        F: Fn(&Array1<f64>) -> f64 + Sync,
    {
        let values: Vec<f64> = match &self.pool {
            Some(pool) if candidates.len() > 1 => pool.install(|| {
                candidates.par_iter().map(|x| sanitize(func(x))).collect()
            }),
            _ => candidates.iter().map(|x| sanitize(func(x))).collect(),
        };
        Array1::from(values)
    }
}
