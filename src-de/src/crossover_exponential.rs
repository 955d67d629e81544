use ndarray::Array1;
use rand::Rng;

/// Exponential crossover: copy a contiguous (cyclic) run of mutant coordinates
/// starting at a random position; the run continues while `U(0,1) < cr`.
pub(crate) fn exponential_crossover<R: Rng + ?Sized>(
    target: &Array1<f64>,
    mutant: &Array1<f64>,
    cr: f64,
    rng: &mut R,
) -> Array1<f64> {
    let n = target.len();
    let mut trial = target.clone();
    let mut j = rng.random_range(0..n);
    let mut copied = 0;
    loop {
        trial[j] = mutant[j];
        copied += 1;
        j = (j + 1) % n;
        if copied >= n || rng.random::<f64>() >= cr {
            break;
        }
    }
    trial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossover_binomial::binomial_crossover;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_crossovers_take_at_least_one_mutant_coordinate() {
        let target = Array1::zeros(5);
        let mutant = Array1::from_elem(5, 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let a = binomial_crossover(&target, &mutant, 0.0, &mut rng);
            assert_eq!(a.sum(), 1.0);
            let b = exponential_crossover(&target, &mutant, 0.0, &mut rng);
            assert_eq!(b.sum(), 1.0);
        }
        let full = exponential_crossover(&target, &mutant, 1.0, &mut rng);
        assert_eq!(full.sum(), 5.0);
    }
}
