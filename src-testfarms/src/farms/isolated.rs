use std::f64::consts::PI;

use yawopt::{EvaluationError, FlowFieldModel, Layout, WindCondition};

/// Turbines that never see each other's wakes: `P = 0.5 rho A Cp U^3 cos(yaw)^p`.
///
/// Power only decreases with yaw magnitude, so the optimum is zero yaw everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedTurbineFarm {
    pub rotor_diameter: f64,
    pub power_coefficient: f64,
    pub air_density: f64,
    pub cosine_exponent: f64,
}

impl Default for IsolatedTurbineFarm {
    fn default() -> Self {
        Self { rotor_diameter: 126.0, power_coefficient: 0.45, air_density: 1.225, cosine_exponent: 1.88 }
    }
}

impl FlowFieldModel for IsolatedTurbineFarm {
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        if yaw.len() != layout.len() {
            return Err(EvaluationError::LengthMismatch { expected: layout.len(), got: yaw.len() });
        }
        let area = PI * (self.rotor_diameter / 2.0).powi(2);
        let free = 0.5 * self.air_density * area * self.power_coefficient * wind.speed().powi(3);
        Ok(yaw
            .iter()
            .map(|y| free * y.to_radians().cos().max(0.0).powf(self.cosine_exponent))
            .collect())
    }

    fn name(&self) -> &str {
        "isolated"
    }
}
