use std::fmt;
use std::path::Path;

use crate::error::YawError;
use crate::farm::FarmDescription;
use crate::outcome::OptimizationOutcome;

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    // adding 0.0 turns -0.0 into 0.0
    (v * scale).round() / scale + 0.0
}

/// Plain-text summary of one optimization run
pub struct OutcomeReport<'a> {
    pub farm: &'a FarmDescription,
    pub outcome: &'a OptimizationOutcome,
}

impl<'a> OutcomeReport<'a> {
    pub fn new(farm: &'a FarmDescription, outcome: &'a OptimizationOutcome) -> Self {
        Self { farm, outcome }
    }

    /// Yaw angles rounded to two decimals
    pub fn rounded_yaw(&self) -> Vec<f64> {
        self.outcome.yaw.as_slice().iter().map(|&y| round_to(y, 2)).collect()
    }

    /// Gain rounded to four decimals, `None` when undefined
    pub fn rounded_gain(&self) -> Option<f64> {
        self.outcome.gain_percent.map(|g| round_to(g, 4))
    }

    pub fn save(&self, path: &Path) -> Result<(), YawError> {
        std::fs::write(path, self.to_string()).map_err(|e| YawError::io(path, e))
    }
}

impl fmt::Display for OutcomeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props = &self.farm.farm.properties;
        writeln!(f, "Data from the wind farm yaw optimization")?;
        writeln!(f)?;
        writeln!(f, "-Farm name: {}", self.farm.name())?;
        writeln!(f, "-Description: {}", self.farm.description())?;
        writeln!(f, "-Wind direction (deg): {}", props.wind_direction)?;
        writeln!(f, "-Wind speed (m/s): {}", props.wind_speed)?;
        writeln!(f, "-Wind farm coordinates (in meters):")?;
        writeln!(f)?;
        writeln!(f, " ---X-coordinates:{:?}", props.layout_x)?;
        writeln!(f, " ---Y-coordinates:{:?}", props.layout_y)?;
        writeln!(f)?;
        writeln!(f, "-Yaw angles after optimization:")?;
        writeln!(f, "{:?}", self.rounded_yaw())?;
        writeln!(f)?;
        writeln!(f, "-Power before the optimization (W): {}", self.outcome.baseline.total)?;
        writeln!(f, "-Power after the optimization (W): {}", self.outcome.optimized.total)?;
        writeln!(f)?;
        match self.rounded_gain() {
            Some(g) => write!(f, "-Total gain in power production from yaw angle optimization: {} %", g),
            None => write!(
                f,
                "-Total gain in power production from yaw angle optimization: undefined (baseline power is not positive)"
            ),
        }
    }
}
