use ndarray::{Array1, Array2};
use rand::Rng;

use crate::distinct_indices::distinct_indices;

/// rand/1: `x_r0 + F (x_r1 - x_r2)`
pub(crate) fn mutant_rand1<R: Rng + ?Sized>(i: usize, pop: &Array2<f64>, f: f64, rng: &mut R) -> Array1<f64> {
    let idxs = distinct_indices(i, 3, pop.nrows(), rng);
    let diff = &pop.row(idxs[1]) - &pop.row(idxs[2]);
    &pop.row(idxs[0]) + &(diff * f)
}
