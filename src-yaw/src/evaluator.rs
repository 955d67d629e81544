//! Objective evaluator: the numerical contract between the flow-field model
//! and the search.
//!
//! Powers are in watts and non-negative. Any model failure, wrong-sized
//! response or non-finite/negative power becomes an [`EvaluationError`]; the
//! minimizing engines see such candidates as `+inf` energy.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::model::{Layout, WindCondition};

/// External wake/flow-field simulator
///
/// Implementations must be deterministic: identical inputs give identical
/// powers. They are shared across worker threads, hence `Sync`.
pub trait FlowFieldModel: Sync {
    /// Power of each turbine (W) for the given yaw angles (degrees)
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError>;

    fn name(&self) -> &str {
        "flow-field model"
    }
}

impl<F> FlowFieldModel for F
where
    F: Fn(&Layout, &WindCondition, &[f64]) -> Result<Vec<f64>, EvaluationError> + Sync,
{
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        self(layout, wind, yaw)
    }
}

/// Total farm power and its per-turbine breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerResult {
    pub total: f64,
    pub turbines: Vec<f64>,
}

impl PowerResult {
    pub fn from_turbines(turbines: Vec<f64>) -> Self {
        Self { total: turbines.iter().sum(), turbines }
    }
}

/// Evaluates yaw vectors for one fixed layout and wind condition
pub struct ObjectiveEvaluator<'a> {
    model: &'a dyn FlowFieldModel,
    layout: &'a Layout,
    wind: &'a WindCondition,
    successes: AtomicUsize,
    failures: AtomicUsize,
}

impl<'a> ObjectiveEvaluator<'a> {
    pub fn new(model: &'a dyn FlowFieldModel, layout: &'a Layout, wind: &'a WindCondition) -> Self {
        Self { model, layout, wind, successes: AtomicUsize::new(0), failures: AtomicUsize::new(0) }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn num_turbines(&self) -> usize {
        self.layout.len()
    }

    /// Evaluate one yaw vector. Bounds are not checked here.
    pub fn evaluate(&self, yaw: &[f64]) -> Result<PowerResult, EvaluationError> {
        let result = self.evaluate_unchecked(yaw);
        match &result {
            Ok(_) => self.successes.fetch_add(1, Ordering::Relaxed),
            Err(e) => {
                log::debug!("evaluation failed at {:?}: {}", yaw, e);
                self.failures.fetch_add(1, Ordering::Relaxed)
            }
        };
        result
    }

    fn evaluate_unchecked(&self, yaw: &[f64]) -> Result<PowerResult, EvaluationError> {
        let expected = self.layout.len();
        if yaw.len() != expected {
            return Err(EvaluationError::LengthMismatch { expected, got: yaw.len() });
        }
        let powers = self.model.turbine_powers(self.layout, self.wind, yaw)?;
        if powers.len() != expected {
            return Err(EvaluationError::ResponseLength { expected, got: powers.len() });
        }
        if let Some((turbine, &value)) =
            powers.iter().enumerate().find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(EvaluationError::InvalidPower { turbine, value });
        }
        Ok(PowerResult::from_turbines(powers))
    }

    /// Energy for the minimizing engines: `-total`, or `+inf` when evaluation fails
    pub fn energy(&self, x: &Array1<f64>) -> f64 {
        let result = match x.as_slice() {
            Some(yaw) => self.evaluate(yaw),
            None => self.evaluate(&x.to_vec()),
        };
        result.map_or(f64::INFINITY, |p| -p.total)
    }

    /// Number of successful evaluations so far
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }

    /// Number of failed evaluations so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn evaluations(&self) -> usize {
        self.successes() + self.failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout2() -> Layout {
        Layout::from_xy(&[0.0, 500.0], &[0.0, 0.0]).unwrap()
    }

    fn wind() -> WindCondition {
        WindCondition::new(270.0, 8.0).unwrap()
    }

    #[test]
    fn test_evaluate_sums_turbine_powers() {
        let model = |_: &Layout, _: &WindCondition, yaw: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Ok(yaw.iter().map(|y| 100.0 - y).collect())
        };
        let (layout, wind) = (layout2(), wind());
        let evaluator = ObjectiveEvaluator::new(&model, &layout, &wind);
        let power = evaluator.evaluate(&[10.0, 0.0]).unwrap();
        assert_eq!(power.turbines, vec![90.0, 100.0]);
        assert_eq!(power.total, 190.0);
        assert_eq!(evaluator.energy(&Array1::from(vec![0.0, 0.0])), -200.0);
        assert_eq!(evaluator.successes(), 2);
        assert_eq!(evaluator.failures(), 0);
    }

    #[test]
    fn test_invalid_responses_are_errors() {
        let (layout, wind) = (layout2(), wind());

        let short = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Ok(vec![1.0])
        };
        let evaluator = ObjectiveEvaluator::new(&short, &layout, &wind);
        assert_eq!(
            evaluator.evaluate(&[0.0, 0.0]),
            Err(EvaluationError::ResponseLength { expected: 2, got: 1 })
        );

        let negative = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Ok(vec![1.0, -2.0])
        };
        let evaluator = ObjectiveEvaluator::new(&negative, &layout, &wind);
        assert!(matches!(
            evaluator.evaluate(&[0.0, 0.0]),
            Err(EvaluationError::InvalidPower { turbine: 1, .. })
        ));

        let nan = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Ok(vec![f64::NAN, 1.0])
        };
        let evaluator = ObjectiveEvaluator::new(&nan, &layout, &wind);
        assert_eq!(evaluator.energy(&Array1::zeros(2)), f64::INFINITY);
        assert_eq!(evaluator.failures(), 1);
    }

    #[test]
    fn test_length_mismatch_never_reaches_the_model() {
        let model = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            panic!("model must not be called")
        };
        let (layout, wind) = (layout2(), wind());
        let evaluator = ObjectiveEvaluator::new(&model, &layout, &wind);
        assert_eq!(
            evaluator.evaluate(&[0.0]),
            Err(EvaluationError::LengthMismatch { expected: 2, got: 1 })
        );
        assert_eq!(evaluator.evaluations(), 1);
    }

    #[test]
    fn test_model_errors_count_as_failures() {
        let model = |_: &Layout, _: &WindCondition, _: &[f64]| -> Result<Vec<f64>, EvaluationError> {
            Err(EvaluationError::model("solver diverged"))
        };
        let (layout, wind) = (layout2(), wind());
        let evaluator = ObjectiveEvaluator::new(&model, &layout, &wind);
        let err = evaluator.evaluate(&[0.0, 0.0]).unwrap_err();
        assert_eq!(err.to_string(), "flow-field model failed: solver diverged");
        assert_eq!(evaluator.model_name(), "flow-field model");
        assert_eq!((evaluator.successes(), evaluator.failures()), (0, 1));
    }
}
