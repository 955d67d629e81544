use ndarray::Array1;
use rand::Rng;

/// Uniform crossover: each coordinate comes from the mutant with probability `cr`,
/// and at least one coordinate always does.
pub(crate) fn binomial_crossover<R: Rng + ?Sized>(
    target: &Array1<f64>,
    mutant: &Array1<f64>,
    cr: f64,
    rng: &mut R,
) -> Array1<f64> {
    let n = target.len();
    let jrand = rng.random_range(0..n);
    Array1::from_shape_fn(n, |j| {
        if j == jrand || rng.random::<f64>() < cr { mutant[j] } else { target[j] }
    })
}
