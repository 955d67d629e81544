//! Synthetic flow-field models for the yaw optimizer
//!
//! Benchmark farms with known behaviour, standing in for a real wake simulator:
//!
//! - **gaussian-wake**: interacting turbines with yaw-deflected Gaussian wakes
//! - **separable-concave**: independent turbines with a known optimum
//! - **isolated**: independent turbines, optimum at zero yaw
//! - failure-injecting wrappers for error-handling tests
//!
//! # Example
//!
//! ```rust
//! use yawopt::{OptimizerConfig, YawOptimizer, WindCondition};
//! use yawopt_testfarms::{GaussianWakeFarm, row_layout};
//!
//! let layout = row_layout(3, 800.0).unwrap();
//! let wind = WindCondition::new(270.0, 8.0).unwrap();
//! let config = OptimizerConfig::builder().seed(1).build();
//! let outcome = YawOptimizer::new(config)
//!     .unwrap()
//!     .optimize_with_config_bounds(&GaussianWakeFarm::default(), &layout, &wind)
//!     .unwrap();
//! assert!(outcome.optimized.total >= outcome.baseline.total);
//! ```

use std::collections::HashMap;

use yawopt::FlowFieldModel;

pub mod farms;
pub mod layouts;

pub use farms::*;
pub use layouts::{alpha_ventus_description, alpha_ventus_grid, grid_layout, row_layout};

/// Description of a synthetic farm
#[derive(Debug, Clone)]
pub struct FarmMetadata {
    /// Model name
    pub name: String,
    /// What the model exercises
    pub description: String,
    /// Whether turbines affect each other
    pub interacting: bool,
    /// Where the optimum lies, when known in closed form
    pub known_optimum: Option<String>,
}

/// Synthetic models selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SyntheticFarm {
    GaussianWake,
    SeparableConcave,
    Isolated,
}

impl SyntheticFarm {
    /// Build the model for a farm of `n` turbines
    pub fn build(self, n: usize) -> Box<dyn FlowFieldModel> {
        match self {
            SyntheticFarm::GaussianWake => Box::new(GaussianWakeFarm::default()),
            SyntheticFarm::SeparableConcave => Box::new(SeparableConcaveFarm::spread(n, 5.0, 20.0)),
            SyntheticFarm::Isolated => Box::new(IsolatedTurbineFarm::default()),
        }
    }
}

/// Get metadata for all synthetic farms
pub fn get_farm_metadata() -> HashMap<String, FarmMetadata> {
    let mut metadata = HashMap::new();

    metadata.insert(
        "gaussian-wake".to_string(),
        FarmMetadata {
            name: "gaussian-wake".to_string(),
            description: "Yaw-deflected Gaussian wakes combined as root sum of squares".to_string(),
            interacting: true,
            known_optimum: None,
        },
    );

    metadata.insert(
        "separable-concave".to_string(),
        FarmMetadata {
            name: "separable-concave".to_string(),
            description: "Independent concave power curves, peaks spread over 5..20 deg".to_string(),
            interacting: false,
            known_optimum: Some("each turbine at its peak, clipped to the bounds".to_string()),
        },
    );

    metadata.insert(
        "isolated".to_string(),
        FarmMetadata {
            name: "isolated".to_string(),
            description: "Independent turbines losing cos(yaw)^1.88 of their power".to_string(),
            interacting: false,
            known_optimum: Some("zero yaw".to_string()),
        },
    );

    metadata
}
