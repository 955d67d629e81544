use ndarray::{Array1, Array2};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

/// rand-to-best/1: `x_r0 + F (x_best - x_r0) + F (x_r1 - x_r2)`
pub(crate) fn mutant_rand_to_best1<R: Rng + ?Sized>(
    i: usize,
    pop: &Array2<f64>,
    best_idx: usize,
    f: f64,
    rng: &mut R,
) -> Array1<f64> {
    let idxs = distinct_indices(i, 3, pop.nrows(), rng);
    let base = pop.row(idxs[0]);
    let towards_best = &pop.row(best_idx) - &base;
    let diff = &pop.row(idxs[1]) - &pop.row(idxs[2]);
    &base + &((towards_best + diff) * f)
}
