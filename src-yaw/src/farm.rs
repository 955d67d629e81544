use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::YawError;
use crate::model::{Layout, WindCondition};

/// Farm description file:
///
/// ```json
/// { "farm": { "name": "...", "description": "...",
///   "properties": { "wind_direction": 270.0, "wind_speed": 8.0,
///                   "layout_x": [0.0, 800.0], "layout_y": [0.0, 0.0] } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmDescription {
    pub farm: Farm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub properties: FarmProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmProperties {
    /// Degrees, meteorological convention
    pub wind_direction: f64,
    /// m/s
    pub wind_speed: f64,
    pub layout_x: Vec<f64>,
    pub layout_y: Vec<f64>,
}

impl FarmDescription {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        wind: &WindCondition,
        layout: &Layout,
    ) -> Self {
        Self {
            farm: Farm {
                name: name.into(),
                description: description.into(),
                properties: FarmProperties {
                    wind_direction: wind.direction(),
                    wind_speed: wind.speed(),
                    layout_x: layout.xs(),
                    layout_y: layout.ys(),
                },
            },
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, YawError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, YawError> {
        let content = std::fs::read_to_string(path).map_err(|e| YawError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn name(&self) -> &str {
        &self.farm.name
    }

    pub fn description(&self) -> &str {
        &self.farm.description
    }

    pub fn layout(&self) -> Result<Layout, YawError> {
        Layout::from_xy(&self.farm.properties.layout_x, &self.farm.properties.layout_y)
    }

    pub fn wind(&self) -> Result<WindCondition, YawError> {
        WindCondition::new(self.farm.properties.wind_direction, self.farm.properties.wind_speed)
    }
}
