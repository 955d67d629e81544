use serde::{Deserialize, Serialize};

use crate::error::YawError;

/// Turbine position in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turbine {
    pub x: f64,
    pub y: f64,
}

impl Turbine {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered turbine positions, index-aligned with yaw vectors
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    turbines: Vec<Turbine>,
}

impl Layout {
    /// Build a layout, rejecting an empty farm and non-finite coordinates
    pub fn new(turbines: Vec<Turbine>) -> Result<Self, YawError> {
        if turbines.is_empty() {
            return Err(YawError::InvalidLayout("layout has no turbines".into()));
        }
        if let Some((i, t)) =
            turbines.iter().enumerate().find(|(_, t)| !t.x.is_finite() || !t.y.is_finite())
        {
            return Err(YawError::InvalidLayout(format!(
                "turbine {} has non-finite position ({}, {})",
                i, t.x, t.y
            )));
        }
        Ok(Self { turbines })
    }

    /// Build a layout from separate coordinate lists
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Result<Self, YawError> {
        if xs.len() != ys.len() {
            return Err(YawError::InvalidLayout(format!(
                "{} x coordinates but {} y coordinates",
                xs.len(),
                ys.len()
            )));
        }
        Self::new(xs.iter().zip(ys).map(|(&x, &y)| Turbine::new(x, y)).collect())
    }

    pub fn len(&self) -> usize {
        self.turbines.len()
    }

    /// Always false, a layout holds at least one turbine
    pub fn is_empty(&self) -> bool {
        self.turbines.is_empty()
    }

    pub fn turbines(&self) -> &[Turbine] {
        &self.turbines
    }

    pub fn xs(&self) -> Vec<f64> {
        self.turbines.iter().map(|t| t.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.turbines.iter().map(|t| t.y).collect()
    }
}

/// Ambient wind: meteorological direction (where the wind comes from) and speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindCondition {
    direction_deg: f64,
    speed_ms: f64,
}

impl WindCondition {
    /// Direction wraps into `[0, 360)`; speed must be strictly positive
    pub fn new(direction_deg: f64, speed_ms: f64) -> Result<Self, YawError> {
        if !direction_deg.is_finite() {
            return Err(YawError::InvalidWind(format!("direction {} is not finite", direction_deg)));
        }
        if !speed_ms.is_finite() || speed_ms <= 0.0 {
            return Err(YawError::InvalidWind(format!(
                "speed must be positive, got {} m/s",
                speed_ms
            )));
        }
        let mut direction = direction_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if direction >= 360.0 {
            direction = 0.0;
        }
        Ok(Self { direction_deg: direction, speed_ms })
    }

    pub fn direction(&self) -> f64 {
        self.direction_deg
    }

    pub fn speed(&self) -> f64 {
        self.speed_ms
    }

    /// Unit vector pointing downwind: 270° blows toward +x, 180° toward +y
    pub fn flow_vector(&self) -> (f64, f64) {
        let theta = self.direction_deg.to_radians();
        (-theta.sin(), -theta.cos())
    }
}
