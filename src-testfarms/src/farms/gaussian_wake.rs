//! Gaussian-wake benchmark surface.
//!
//! A qualitative stand-in for a wake simulator, not a physical model: each
//! turbine casts a Gaussian velocity deficit downstream whose width grows
//! linearly with distance and whose centre is pushed sideways when the turbine
//! is yawed. Deficits from several upstream turbines combine as a root sum of
//! squares. Yawing costs the yawed turbine `cos(yaw)^p` of its power.

use std::f64::consts::PI;

use yawopt::{EvaluationError, FlowFieldModel, Layout, WindCondition};

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianWakeFarm {
    /// m
    pub rotor_diameter: f64,
    /// W
    pub rated_power: f64,
    pub power_coefficient: f64,
    pub thrust_coefficient: f64,
    /// m/s
    pub cut_in_speed: f64,
    /// kg/m^3
    pub air_density: f64,
    /// Wake width growth per meter downstream
    pub wake_expansion: f64,
    /// Exponent `p` of the `cos(yaw)^p` power loss
    pub cosine_exponent: f64,
    /// Lateral wake displacement per meter downstream at full deflection
    pub deflection_gain: f64,
}

impl Default for GaussianWakeFarm {
    fn default() -> Self {
        Self {
            rotor_diameter: 126.0,
            rated_power: 5.0e6,
            power_coefficient: 0.45,
            thrust_coefficient: 0.8,
            cut_in_speed: 3.0,
            air_density: 1.225,
            wake_expansion: 0.04,
            cosine_exponent: 1.88,
            deflection_gain: 0.5,
        }
    }
}

impl GaussianWakeFarm {
    pub fn rotor_area(&self) -> f64 {
        PI * (self.rotor_diameter / 2.0).powi(2)
    }

    /// Power of an unyawed turbine facing `speed`, capped at rated power
    pub fn free_stream_power(&self, speed: f64) -> f64 {
        if speed < self.cut_in_speed {
            return 0.0;
        }
        let p = 0.5 * self.air_density * self.rotor_area() * self.power_coefficient * speed.powi(3);
        p.min(self.rated_power)
    }

    /// Fractional velocity deficit at `downstream`/`crosswind` meters from a
    /// turbine yawed by `yaw_deg`
    pub fn wake_deficit(&self, downstream: f64, crosswind: f64, yaw_deg: f64) -> f64 {
        if downstream <= 0.0 {
            return 0.0;
        }
        let d = self.rotor_diameter;
        let gamma = yaw_deg.to_radians();
        let cos2 = gamma.cos().powi(2);
        let sigma = d / 4.0 + self.wake_expansion * downstream;
        let ct = self.thrust_coefficient * cos2;
        let centre = 1.0 - (1.0 - ct / (8.0 * (sigma / d).powi(2))).max(0.0).sqrt();
        let offset = downstream * self.deflection_gain * gamma.sin() * cos2;
        centre * (-(crosswind - offset).powi(2) / (2.0 * sigma * sigma)).exp()
    }
}

impl FlowFieldModel for GaussianWakeFarm {
    fn turbine_powers(
        &self,
        layout: &Layout,
        wind: &WindCondition,
        yaw: &[f64],
    ) -> Result<Vec<f64>, EvaluationError> {
        if yaw.len() != layout.len() {
            return Err(EvaluationError::LengthMismatch { expected: layout.len(), got: yaw.len() });
        }
        let (fx, fy) = wind.flow_vector();
        let turbines = layout.turbines();

        let powers = turbines
            .iter()
            .enumerate()
            .map(|(j, tj)| {
                let deficit_sq: f64 = turbines
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != j)
                    .map(|(i, ti)| {
                        let (dx, dy) = (tj.x - ti.x, tj.y - ti.y);
                        let downstream = dx * fx + dy * fy;
                        let crosswind = dy * fx - dx * fy;
                        self.wake_deficit(downstream, crosswind, yaw[i]).powi(2)
                    })
                    .sum();
                let speed = wind.speed() * (1.0 - deficit_sq.sqrt().min(1.0));
                let yaw_loss = yaw[j].to_radians().cos().max(0.0).powf(self.cosine_exponent);
                self.free_stream_power(speed) * yaw_loss
            })
            .collect();
        Ok(powers)
    }

    fn name(&self) -> &str {
        "gaussian-wake"
    }
}
