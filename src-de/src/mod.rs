//! Differential Evolution (DE) global optimizer in pure Rust using ndarray
//!
//! A bounded, derivative-free minimizer in the spirit of SciPy's
//! `scipy.optimize.differential_evolution`, tuned for expensive black-box
//! objectives:
//!
//! - Box constraints (lower/upper bounds), with fixed variables when `lower == upper`
//! - Strategies: best1, rand1, currenttobest1, randtobest1 with binomial or exponential crossover
//! - Mutation as a fixed factor or dithering in a range [min,max)
//! - Initialization: Latin Hypercube Sampling (LHS) or random uniform
//! - Optional initial guess `x0` injected into the initial population
//! - Convergence by std(pop_f) <= atol + tol * |mean(pop_f)|
//! - Evaluation budget and wall-clock limit checked between generations
//! - Optional pattern-search polishing of the best member
//! - Deterministic under a fixed seed, with or without parallel evaluation

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod clip_free_inplace;
pub mod crossover_binomial;
pub mod crossover_exponential;
pub mod differential_evolution;
pub mod distinct_indices;
pub mod init_latin_hypercube;
pub mod init_random;
pub mod mutant_best1;
pub mod mutant_current_to_best1;
pub mod mutant_rand1;
pub mod mutant_rand_to_best1;
pub mod parallel_eval;
pub mod pattern_search;
pub mod recorder;

pub use differential_evolution::differential_evolution;
pub use init_latin_hypercube::init_latin_hypercube;
pub use parallel_eval::{ParallelConfig, ParallelEvaluator};
pub use pattern_search::{pattern_search, PatternSearchConfig, PatternSearchReport};
pub use recorder::{OptimizationRecord, OptimizationRecorder, RecorderError};

/// Smallest population the mutation operators can work with.
pub const MIN_POPULATION: usize = 5;

/// With an evaluation budget, the initial population gets `1 / BUDGET_SHARES` of it
pub const BUDGET_SHARES: usize = 4;

/// Index and value of the smallest energy, lowest index on exact ties.
pub(crate) fn argmin(v: &Array1<f64>) -> (usize, f64) {
	let mut best_i = 0usize;
	let mut best_v = v[0];
	for (i, &val) in v.iter().enumerate() {
		if val < best_v {
			best_v = val;
			best_i = i;
		}
	}
	(best_i, best_v)
}

/// Index of the largest energy, lowest index on exact ties.
fn argmax(v: &Array1<f64>) -> usize {
	let mut worst_i = 0usize;
	let mut worst_v = v[0];
	for (i, &val) in v.iter().enumerate() {
		if val > worst_v {
			worst_v = val;
			worst_i = i;
		}
	}
	worst_i
}

/// Mean and standard deviation of the energies.
///
/// Returns `None` while some member is still infeasible (`+inf`), since the
/// spread of such a population says nothing about convergence.
pub(crate) fn population_spread(energies: &Array1<f64>) -> Option<(f64, f64)> {
	if energies.iter().any(|e| !e.is_finite()) {
		return None;
	}
	let mean = energies.mean()?;
	Some((mean, energies.std(0.0)))
}

/// Differential Evolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
	Best1Bin,
	Best1Exp,
	Rand1Bin,
	Rand1Exp,
	CurrentToBest1Bin,
	CurrentToBest1Exp,
	RandToBest1Bin,
	RandToBest1Exp,
}

impl Strategy {
	fn crossover(self) -> Crossover {
		match self {
			Strategy::Best1Bin
			| Strategy::Rand1Bin
			| Strategy::CurrentToBest1Bin
			| Strategy::RandToBest1Bin => Crossover::Binomial,
			Strategy::Best1Exp
			| Strategy::Rand1Exp
			| Strategy::CurrentToBest1Exp
			| Strategy::RandToBest1Exp => Crossover::Exponential,
		}
	}
}

impl FromStr for Strategy {
	type Err = String;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let t = s.to_lowercase();
		match t.as_str() {
			"best1bin" | "best1" => Ok(Strategy::Best1Bin),
			"best1exp" => Ok(Strategy::Best1Exp),
			"rand1bin" | "rand1" => Ok(Strategy::Rand1Bin),
			"rand1exp" => Ok(Strategy::Rand1Exp),
			"currenttobest1bin" | "current-to-best1bin" | "current_to_best1bin" => {
				Ok(Strategy::CurrentToBest1Bin)
			}
			"currenttobest1exp" | "current-to-best1exp" | "current_to_best1exp" => {
				Ok(Strategy::CurrentToBest1Exp)
			}
			"randtobest1bin" | "rand-to-best1bin" | "rand_to_best1bin" => {
				Ok(Strategy::RandToBest1Bin)
			}
			"randtobest1exp" | "rand-to-best1exp" | "rand_to_best1exp" => {
				Ok(Strategy::RandToBest1Exp)
			}
			_ => Err(format!("unknown strategy: {}", s)),
		}
	}
}

/// Crossover type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Crossover {
	/// Binomial (uniform) crossover
	#[default]
	Binomial,
	/// Exponential crossover
	Exponential,
}

/// Mutation setting: either a fixed factor or a uniform range (dithering)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mutation {
	/// Fixed mutation factor F in [0, 2)
	Factor(f64),
	/// Dithering range [min, max) with 0 <= min < max <= 2
	Range { min: f64, max: f64 },
}

impl Default for Mutation {
	fn default() -> Self {
		Mutation::Range { min: 0.5, max: 1.0 }
	}
}

impl Mutation {
	fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
		match *self {
			Mutation::Factor(f) => f,
			Mutation::Range { min, max } if max > min => rng.random_range(min..max),
			Mutation::Range { min, .. } => min,
		}
	}
}

/// Initialization scheme for the population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Init {
	#[default]
	LatinHypercube,
	Random,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	/// Population energies collapsed below the tolerance
	Converged,
	/// `maxiter` generations were run
	MaxIterations,
	/// The next generation would have exceeded `maxfev`
	MaxEvaluations,
	/// The wall-clock limit passed
	TimeLimit,
	/// The callback asked to stop
	Callback,
	/// Every variable is fixed by its bounds
	AllFixed,
}

impl Termination {
	/// Whether the run ended on a resource limit rather than by converging.
	pub fn is_budget_exhausted(self) -> bool {
		matches!(self, Termination::MaxIterations | Termination::MaxEvaluations | Termination::TimeLimit)
	}
}

/// Configuration for the Differential Evolution optimizer
pub struct DEConfig {
	pub maxiter: usize,
	pub popsize: usize, // total NP = popsize * n_params_free
	pub tol: f64,
	pub atol: f64,
	pub mutation: Mutation,
	pub recombination: f64, // CR in [0,1]
	pub strategy: Strategy,
	pub init: Init,
	pub seed: Option<u64>,
	/// Optional initial guess, replaces the worst member after init
	pub x0: Option<Array1<f64>>,
	/// Maximum number of objective evaluations, polishing included
	pub maxfev: Option<usize>,
	/// Wall-clock limit, checked between generations
	pub time_limit: Option<Duration>,
	/// Optional per-iteration callback (may stop early)
	pub callback: Option<Box<dyn FnMut(&DEIntermediate) -> CallbackAction + Send>>,
	/// Local refinement of the best member after the main loop
	pub polish: Option<PatternSearchConfig>,
	/// Parallel evaluation configuration
	pub parallel: ParallelConfig,
}

impl Default for DEConfig {
	fn default() -> Self {
		Self {
			maxiter: 1000,
			popsize: 15,
			tol: 1e-2,
			atol: 0.0,
			mutation: Mutation::default(),
			recombination: 0.7,
			strategy: Strategy::Best1Bin,
			init: Init::default(),
			seed: None,
			x0: None,
			maxfev: None,
			time_limit: None,
			callback: None,
			polish: None,
			parallel: ParallelConfig::default(),
		}
	}
}

impl fmt::Debug for DEConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DEConfig")
			.field("maxiter", &self.maxiter)
			.field("popsize", &self.popsize)
			.field("tol", &self.tol)
			.field("atol", &self.atol)
			.field("mutation", &self.mutation)
			.field("recombination", &self.recombination)
			.field("strategy", &self.strategy)
			.field("init", &self.init)
			.field("seed", &self.seed)
			.field("maxfev", &self.maxfev)
			.field("time_limit", &self.time_limit)
			.field("callback", &self.callback.is_some())
			.field("polish", &self.polish)
			.field("parallel", &self.parallel)
			.finish()
	}
}

/// Fluent builder for `DEConfig` for ergonomic configuration.
#[derive(Default)]
pub struct DEConfigBuilder {
	cfg: DEConfig,
}
impl DEConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: DEConfig::default() }
	}
	pub fn maxiter(mut self, v: usize) -> Self {
		self.cfg.maxiter = v;
		self
	}
	pub fn popsize(mut self, v: usize) -> Self {
		self.cfg.popsize = v;
		self
	}
	pub fn tol(mut self, v: f64) -> Self {
		self.cfg.tol = v;
		self
	}
	pub fn atol(mut self, v: f64) -> Self {
		self.cfg.atol = v;
		self
	}
	pub fn mutation(mut self, v: Mutation) -> Self {
		self.cfg.mutation = v;
		self
	}
	pub fn recombination(mut self, v: f64) -> Self {
		self.cfg.recombination = v;
		self
	}
	pub fn strategy(mut self, v: Strategy) -> Self {
		self.cfg.strategy = v;
		self
	}
	pub fn init(mut self, v: Init) -> Self {
		self.cfg.init = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn x0(mut self, v: Array1<f64>) -> Self {
		self.cfg.x0 = Some(v);
		self
	}
	pub fn maxfev(mut self, v: usize) -> Self {
		self.cfg.maxfev = Some(v);
		self
	}
	pub fn time_limit(mut self, v: Duration) -> Self {
		self.cfg.time_limit = Some(v);
		self
	}
	pub fn callback(mut self, cb: Box<dyn FnMut(&DEIntermediate) -> CallbackAction + Send>) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn polish(mut self, pol: PatternSearchConfig) -> Self {
		self.cfg.polish = Some(pol);
		self
	}
	pub fn parallel(mut self, parallel: ParallelConfig) -> Self {
		self.cfg.parallel = parallel;
		self
	}
	pub fn enable_parallel(mut self, enable: bool) -> Self {
		self.cfg.parallel.enabled = enable;
		self
	}
	pub fn parallel_threads(mut self, num_threads: usize) -> Self {
		self.cfg.parallel.num_threads = Some(num_threads);
		self
	}
	pub fn build(self) -> DEConfig {
		self.cfg
	}
}

/// Result/Report of a DE optimization run
#[derive(Clone)]
pub struct DEReport {
	pub x: Array1<f64>,
	pub fun: f64,
	pub success: bool,
	pub termination: Termination,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
	pub population: Array2<f64>,
	pub population_energies: Array1<f64>,
}

impl fmt::Debug for DEReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DEReport")
			.field("x", &format!("len={}", self.x.len()))
			.field("fun", &self.fun)
			.field("success", &self.success)
			.field("termination", &self.termination)
			.field("message", &self.message)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.field(
				"population",
				&format!("{}x{}", self.population.nrows(), self.population.ncols()),
			)
			.field("population_energies", &format!("len={}", self.population_energies.len()))
			.finish()
	}
}

/// Information passed to callback after each generation
#[derive(Debug, Clone)]
pub struct DEIntermediate {
	pub x: Array1<f64>,
	pub fun: f64,
	pub convergence: f64, // measured as std(pop_f), infinite while some member is infeasible
	pub iter: usize,
	pub nfev: usize,
}

/// Action returned by callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
	Continue,
	Stop,
}

/// Differential Evolution optimizer
pub struct DifferentialEvolution<'a, F>
where
	F: Fn(&Array1<f64>) -> f64 + Sync,
{
	func: &'a F,
	lower: Array1<f64>,
	upper: Array1<f64>,
	config: DEConfig,
}

impl<'a, F> DifferentialEvolution<'a, F>
where
	F: Fn(&Array1<f64>) -> f64 + Sync,
{
	/// Create a new DE optimizer with objective `func` and bounds [lower, upper]
	pub fn new(func: &'a F, lower: Array1<f64>, upper: Array1<f64>) -> Self {
		assert_eq!(lower.len(), upper.len(), "lower/upper size mismatch");
		Self { func, lower, upper, config: DEConfig::default() }
	}

	/// Mutable access to configuration
	pub fn config_mut(&mut self) -> &mut DEConfig {
		&mut self.config
	}

	fn budget_left(&self, nfev: usize) -> Option<usize> {
		self.config.maxfev.map(|m| m.saturating_sub(nfev))
	}

	/// Run the optimization and return a report
	pub fn solve(&mut self) -> DEReport {
		use clip_free_inplace::clip_free_inplace;
		use crossover_binomial::binomial_crossover;
		use crossover_exponential::exponential_crossover;
		use init_latin_hypercube::init_latin_hypercube;
		use init_random::init_random;
		use mutant_best1::mutant_best1;
		use mutant_current_to_best1::mutant_current_to_best1;
		use mutant_rand1::mutant_rand1;
		use mutant_rand_to_best1::mutant_rand_to_best1;

		let started = Instant::now();
		let deadline = self.config.time_limit.and_then(|d| started.checked_add(d));
		let n = self.lower.len();
		let func = self.func;
		let evaluator = ParallelEvaluator::new(&self.config.parallel);

		// Identify fixed (equal-bounds) and free variables
		let is_free: Vec<bool> =
			(0..n).map(|i| (self.upper[i] - self.lower[i]).abs() > 0.0).collect();
		let n_free = is_free.iter().filter(|&&b| b).count();
		if n_free == 0 {
			// All fixed; just evaluate x = lower
			let x_fixed = self.lower.clone();
			let f = sanitize(func(&x_fixed));
			return DEReport {
				x: x_fixed,
				fun: f,
				success: true,
				termination: Termination::AllFixed,
				message: "All variables fixed by bounds".into(),
				nit: 0,
				nfev: 1,
				population: Array2::zeros((1, n)),
				population_energies: Array1::from(vec![f]),
			};
		}

		let mut npop = (self.config.popsize * n_free).max(MIN_POPULATION);
		if let Some(maxfev) = self.config.maxfev {
			// the initial population may take at most a quarter of the budget,
			// the rest goes to generations and polishing
			let reserved = usize::from(self.config.x0.is_some());
			npop = npop.min(maxfev.saturating_sub(reserved) / BUDGET_SHARES).max(MIN_POPULATION);
		}

		log::debug!(
			"DE init: {} dimensions ({} free), population={}, maxiter={}, maxfev={:?}",
			n,
			n_free,
			npop,
			self.config.maxiter,
			self.config.maxfev
		);
		log::debug!(
			"  strategy: {:?}, mutation: {:?}, CR={:.3}, tol={:.2e}, atol={:.2e}",
			self.config.strategy,
			self.config.mutation,
			self.config.recombination,
			self.config.tol,
			self.config.atol
		);

		// Timing toggle via env var
		let timing_enabled = std::env::var("YAWOPT_DE_TIMING").map(|v| v != "0").unwrap_or(false);

		// RNG
		let mut rng: StdRng = match self.config.seed {
			Some(s) => StdRng::seed_from_u64(s),
			None => {
				let mut thread_rng = rand::rng();
				StdRng::from_rng(&mut thread_rng)
			}
		};

		// Initialize population in [lower, upper]
		let mut pop = match self.config.init {
			Init::LatinHypercube => {
				init_latin_hypercube(n, npop, &self.lower, &self.upper, &is_free, &mut rng)
			}
			Init::Random => init_random(n, npop, &self.lower, &self.upper, &is_free, &mut rng),
		};

		let t_eval0 = Instant::now();
		let mut energies = evaluator.evaluate_rows(&pop, func);
		let mut nfev = npop;
		if timing_enabled {
			log::debug!("TIMING init: eval={:.3} ms", t_eval0.elapsed().as_secs_f64() * 1e3);
		}

		// If x0 provided, it replaces the worst initial member
		if let Some(x0) = &self.config.x0 {
			let mut x0c = x0.clone();
			clip_free_inplace(&mut x0c, &self.lower, &self.upper, &is_free);
			let f0 = sanitize(func(&x0c));
			nfev += 1;
			let worst = argmax(&energies);
			pop.row_mut(worst).assign(&x0c.view());
			energies[worst] = f0;
		}

		let (mut best_idx, mut best_f) = argmin(&energies);
		let mut best_x = pop.row(best_idx).to_owned();
		log::debug!("DE iter {:4}  best_f={:.6e} at index {}", 0, best_f, best_idx);

		let mut termination = Termination::MaxIterations;
		let mut message = format!("Maximum iterations reached: {}", self.config.maxiter);
		let mut nit = 0;

		for iter in 1..=self.config.maxiter {
			if let Some(left) = self.budget_left(nfev) {
				if left < npop {
					termination = Termination::MaxEvaluations;
					message = format!("Evaluation budget exhausted after {} evaluations", nfev);
					break;
				}
			}
			if deadline.is_some_and(|d| Instant::now() >= d) {
				termination = Termination::TimeLimit;
				message = format!("Time limit reached after {} generations", nit);
				break;
			}
			nit = iter;

			let iter_start = Instant::now();
			let strategy = self.config.strategy;
			let mutation = self.config.mutation;
			let cr = self.config.recombination;
			let seed = self.config.seed;

			// Trials are built sequentially: every individual owns an RNG derived
			// from (seed, generation, index), which keeps runs reproducible.
			let trials: Vec<Array1<f64>> = (0..npop)
				.map(|i| {
					let mut local_rng: StdRng = match seed {
						Some(base_seed) => StdRng::seed_from_u64(
							base_seed.wrapping_add((iter as u64) << 32).wrapping_add(i as u64),
						),
						None => StdRng::from_rng(&mut rng),
					};
					let f = mutation.sample(&mut local_rng);
					let mutant = match strategy {
						Strategy::Best1Bin | Strategy::Best1Exp => {
							mutant_best1(i, &pop, best_idx, f, &mut local_rng)
						}
						Strategy::Rand1Bin | Strategy::Rand1Exp => {
							mutant_rand1(i, &pop, f, &mut local_rng)
						}
						Strategy::CurrentToBest1Bin | Strategy::CurrentToBest1Exp => {
							mutant_current_to_best1(i, &pop, best_idx, f, &mut local_rng)
						}
						Strategy::RandToBest1Bin | Strategy::RandToBest1Exp => {
							mutant_rand_to_best1(i, &pop, best_idx, f, &mut local_rng)
						}
					};
					let target = pop.row(i).to_owned();
					let mut trial = match strategy.crossover() {
						Crossover::Binomial => {
							binomial_crossover(&target, &mutant, cr, &mut local_rng)
						}
						Crossover::Exponential => {
							exponential_crossover(&target, &mutant, cr, &mut local_rng)
						}
					};
					clip_free_inplace(&mut trial, &self.lower, &self.upper, &is_free);
					trial
				})
				.collect();
			let t_build = iter_start.elapsed();

			let t_eval0 = Instant::now();
			let trial_energies = evaluator.evaluate_all(&trials, func);
			let t_eval = t_eval0.elapsed();
			nfev += npop;

			// Selection phase: update population based on trial results
			let mut accepted_trials = 0;
			for (i, (trial, &trial_energy)) in trials.iter().zip(trial_energies.iter()).enumerate() {
				if trial_energy <= energies[i] {
					pop.row_mut(i).assign(&trial.view());
					energies[i] = trial_energy;
					accepted_trials += 1;
				}
			}

			// Update best solution after generation
			let (new_best_idx, new_best_f) = argmin(&energies);
			let improved = new_best_f < best_f;
			best_idx = new_best_idx;
			if improved {
				best_f = new_best_f;
				best_x = pop.row(best_idx).to_owned();
			}

			if timing_enabled && (iter <= 5 || iter % 10 == 0) {
				log::debug!(
					"TIMING iter {:4}: build={:.3} ms, eval={:.3} ms, total={:.3} ms",
					iter,
					t_build.as_secs_f64() * 1e3,
					t_eval.as_secs_f64() * 1e3,
					iter_start.elapsed().as_secs_f64() * 1e3,
				);
			}

			// Convergence check
			let spread = population_spread(&energies);
			let pop_std = spread.map(|(_, s)| s).unwrap_or(f64::INFINITY);
			log::debug!(
				"DE iter {:4}  best_f={:.6e}  std={:.3e}  accepted={}/{}{}",
				iter,
				best_f,
				pop_std,
				accepted_trials,
				npop,
				if improved { "  (improved)" } else { "" }
			);

			// Callback
			if let Some(ref mut cb) = self.config.callback {
				let intermediate = DEIntermediate {
					x: best_x.clone(),
					fun: best_f,
					convergence: pop_std,
					iter,
					nfev,
				};
				if cb(&intermediate) == CallbackAction::Stop {
					termination = Termination::Callback;
					message = "Optimization stopped by callback".to_string();
					break;
				}
			}

			if let Some((pop_mean, pop_std)) = spread {
				let convergence_threshold = self.config.atol + self.config.tol * pop_mean.abs();
				if pop_std <= convergence_threshold {
					termination = Termination::Converged;
					message = format!(
						"Converged: std(pop_f)={:.3e} <= threshold={:.3e}",
						pop_std, convergence_threshold
					);
					break;
				}
			}
		}

		log::debug!("DE finished: {}", message);

		// Polish if configured and time allows
		let (final_x, final_f, polish_nfev) = match &self.config.polish {
			Some(polish_cfg) if termination != Termination::TimeLimit && best_f.is_finite() => {
				let report = pattern_search(
					func,
					&best_x,
					best_f,
					&self.lower,
					&self.upper,
					polish_cfg,
					self.budget_left(nfev),
					deadline,
					&evaluator,
				);
				log::debug!(
					"DE polish: f {:.6e} -> {:.6e} in {} evaluations",
					best_f,
					report.fun,
					report.nfev
				);
				(report.x, report.fun, report.nfev)
			}
			_ => (best_x, best_f, 0),
		};

		DEReport {
			x: final_x,
			fun: final_f,
			success: termination == Termination::Converged || termination == Termination::Callback,
			termination,
			message,
			nit,
			nfev: nfev + polish_nfev,
			population: pop,
			population_energies: energies,
		}
	}
}

/// NaN energies count as infeasible.
#[inline]
pub(crate) fn sanitize(f: f64) -> f64 {
	if f.is_nan() { f64::INFINITY } else { f }
}
