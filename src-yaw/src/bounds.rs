use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::YawError;

/// Yaw angles in degrees, one per turbine, index-aligned with the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YawVector(Vec<f64>);

impl YawVector {
    pub fn zeros(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every angle is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl From<Vec<f64>> for YawVector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl Index<usize> for YawVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

/// Per-turbine `[lower, upper]` yaw limits in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawYawBounds")]
pub struct YawBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

#[derive(Deserialize)]
struct RawYawBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl TryFrom<RawYawBounds> for YawBounds {
    type Error = YawError;

    fn try_from(raw: RawYawBounds) -> Result<Self, YawError> {
        let bounds = YawBounds { lower: raw.lower, upper: raw.upper };
        bounds.validate()?;
        Ok(bounds)
    }
}

impl YawBounds {
    /// The same `[min_yaw, max_yaw]` pair for all `n` turbines
    pub fn uniform(min_yaw: f64, max_yaw: f64, n: usize) -> Result<Self, YawError> {
        Self::per_turbine(&vec![(min_yaw, max_yaw); n])
    }

    /// One `(min, max)` pair per turbine
    pub fn per_turbine(pairs: &[(f64, f64)]) -> Result<Self, YawError> {
        let bounds = Self {
            lower: pairs.iter().map(|p| p.0).collect(),
            upper: pairs.iter().map(|p| p.1).collect(),
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Same checks as [`Self::per_turbine`], plus matching `lower`/`upper` lengths
    pub fn validate(&self) -> Result<(), YawError> {
        if self.lower.len() != self.upper.len() {
            return Err(YawError::MismatchedBounds { lower: self.lower.len(), upper: self.upper.len() });
        }
        for (turbine, (&min, &max)) in self.lower.iter().zip(&self.upper).enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(YawError::InvalidBounds { turbine, min, max });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.lower.iter().copied().zip(self.upper.iter().copied()).collect()
    }

    /// True when no turbine has room to move
    pub fn is_fixed(&self) -> bool {
        self.lower.iter().zip(&self.upper).all(|(lo, hi)| lo == hi)
    }

    pub fn contains(&self, yaw: &[f64]) -> bool {
        yaw.len() == self.len()
            && yaw.iter().zip(self.lower.iter().zip(&self.upper)).all(|(v, (lo, hi))| v >= lo && v <= hi)
    }

    /// Clip every angle into its interval; NaN goes to the lower bound
    pub fn project(&self, yaw: &mut [f64]) {
        for (v, (lo, hi)) in yaw.iter_mut().zip(self.lower.iter().zip(&self.upper)) {
            *v = if v.is_nan() { *lo } else { v.clamp(*lo, *hi) };
        }
    }

    /// Zero yaw projected into the bounds
    pub fn projected_zero(&self) -> YawVector {
        let mut zero = vec![0.0; self.len()];
        self.project(&mut zero);
        YawVector(zero)
    }
}
