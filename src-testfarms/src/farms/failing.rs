//! Models that fail on purpose, for exercising error handling.

use std::sync::atomic::{AtomicUsize, Ordering};

use yawopt::{EvaluationError, FlowFieldModel, Layout, WindCondition};

/// Every evaluation fails
#[derive(Debug, Clone, Default)]
pub struct AlwaysFailing;

impl FlowFieldModel for AlwaysFailing {
    fn turbine_powers(&self, _: &Layout, _: &WindCondition, _: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        Err(EvaluationError::model("flow field could not be computed"))
    }

    fn name(&self) -> &str {
        "always-failing"
    }
}

/// Every turbine produces nothing
#[derive(Debug, Clone, Default)]
pub struct ZeroPowerFarm;

impl FlowFieldModel for ZeroPowerFarm {
    fn turbine_powers(&self, layout: &Layout, _: &WindCondition, _: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        Ok(vec![0.0; layout.len()])
    }

    fn name(&self) -> &str {
        "zero-power"
    }
}

/// Delegates the first `allowed` calls to `inner`, fails afterwards.
///
/// Only deterministic when evaluated sequentially.
#[derive(Debug)]
pub struct FailAfter<M> {
    inner: M,
    allowed: usize,
    calls: AtomicUsize,
}

impl<M: FlowFieldModel> FailAfter<M> {
    pub fn new(inner: M, allowed: usize) -> Self {
        Self { inner, allowed, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<M: FlowFieldModel> FlowFieldModel for FailAfter<M> {
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call < self.allowed {
            self.inner.turbine_powers(layout, wind, yaw)
        } else {
            Err(EvaluationError::model(format!("call {} after {} allowed", call, self.allowed)))
        }
    }

    fn name(&self) -> &str {
        "fail-after"
    }
}

/// Fails for every yaw vector matching `predicate`, delegates otherwise
pub struct FailWhere<M, P> {
    inner: M,
    predicate: P,
}

impl<M, P> FailWhere<M, P>
where
    M: FlowFieldModel,
    P: Fn(&[f64]) -> bool + Sync,
{
    pub fn new(inner: M, predicate: P) -> Self {
        Self { inner, predicate }
    }
}

impl<M, P> FlowFieldModel for FailWhere<M, P>
where
    M: FlowFieldModel,
    P: Fn(&[f64]) -> bool + Sync,
{
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        if (self.predicate)(yaw) {
            return Err(EvaluationError::model(format!("no solution for yaw {:?}", yaw)));
        }
        self.inner.turbine_powers(layout, wind, yaw)
    }

    fn name(&self) -> &str {
        "fail-where"
    }
}
