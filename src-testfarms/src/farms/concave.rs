use yawopt::{EvaluationError, FlowFieldModel, Layout, WindCondition, YawBounds};

/// Turbines without interaction, each with a concave power curve peaking at
/// its own yaw angle: `P_i = max(0, peak_power - curvature * (yaw_i - peak_i)^2)`.
///
/// The maximum over a box is known in closed form, which makes this farm an
/// oracle for convergence tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparableConcaveFarm {
    pub peaks: Vec<f64>,
    /// W
    pub peak_power: f64,
    /// W per degree squared
    pub curvature: f64,
}

impl SeparableConcaveFarm {
    pub fn new(peaks: Vec<f64>) -> Self {
        Self { peaks, peak_power: 1.0e6, curvature: 100.0 }
    }

    /// `n` peaks evenly spread over `[low, high]`
    pub fn spread(n: usize, low: f64, high: f64) -> Self {
        let peaks = match n {
            0 => vec![],
            1 => vec![0.5 * (low + high)],
            _ => (0..n).map(|i| low + (high - low) * i as f64 / (n - 1) as f64).collect(),
        };
        Self::new(peaks)
    }

    fn turbine_power(&self, yaw: f64, peak: f64) -> f64 {
        (self.peak_power - self.curvature * (yaw - peak).powi(2)).max(0.0)
    }

    /// The maximizing yaw vector inside `bounds`
    pub fn optimum(&self, bounds: &YawBounds) -> Vec<f64> {
        let mut x = self.peaks.clone();
        bounds.project(&mut x);
        x
    }

    /// Total power at [`Self::optimum`]
    pub fn max_total(&self, bounds: &YawBounds) -> f64 {
        self.optimum(bounds).iter().zip(&self.peaks).map(|(&y, &c)| self.turbine_power(y, c)).sum()
    }
}

impl FlowFieldModel for SeparableConcaveFarm {
    fn turbine_powers(
        &self,
        _layout: &Layout,
        _wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        if yaw.len() != self.peaks.len() {
            return Err(EvaluationError::LengthMismatch { expected: self.peaks.len(), got: yaw.len() });
        }
        Ok(yaw.iter().zip(&self.peaks).map(|(&y, &c)| self.turbine_power(y, c)).collect())
    }

    fn name(&self) -> &str {
        "separable-concave"
    }
}
