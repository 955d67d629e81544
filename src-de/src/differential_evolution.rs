use crate::{DEConfig, DEReport, DifferentialEvolution};
use ndarray::Array1;

/// Minimize `func` over the box given by `bounds` with differential evolution.
///
/// `func` returns `+inf` (or NaN) for infeasible points. A pair with
/// `lower == upper` pins that variable.
///
/// # Panics
/// When a pair has `upper < lower`.
pub fn differential_evolution<F>(func: &F, bounds: &[(f64, f64)], config: DEConfig) -> DEReport
where
	F: Fn(&Array1<f64>) -> f64 + Sync,
{
	if let Some(i) = bounds.iter().position(|(lo, hi)| hi < lo) {
		panic!("bound[{}] has upper < lower", i);
	}
	let lower: Array1<f64> = bounds.iter().map(|b| b.0).collect();
	let upper: Array1<f64> = bounds.iter().map(|b| b.1).collect();
	let mut de = DifferentialEvolution::new(func, lower, upper);
	*de.config_mut() = config;
	de.solve()
}
