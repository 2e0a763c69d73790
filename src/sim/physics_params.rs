use serde::{Deserialize, Serialize};

use super::physics::{DEFAULT_AIR_RESISTANCE, DEFAULT_FRICTION, DEFAULT_MAX_DELTA_TIME, GRAVITY};
use super::section::AccelerationSection;
use crate::error::InvalidInput;

/// Parameters for stepping a point mass along a curve.
///
/// Every field has a default so hosts can supply partial configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub gravity: f64,
    pub friction: f64,
    pub air_resistance: f64,
    pub max_delta_time: f64,
    /// Return to the initial state when the track end is passed; loop
    /// around the track otherwise.
    pub reset_when_reached_limit: bool,
    pub initial_velocity: f64,
    pub initial_distance: f64,
    pub sections: Vec<AccelerationSection>,
}

impl SimulationParams {
    pub fn new(gravity: f64, friction: f64, air_resistance: f64) -> Self {
        Self {
            gravity,
            friction,
            air_resistance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InvalidInput> {
        if !self.max_delta_time.is_finite() || self.max_delta_time <= 0.0 {
            return Err(InvalidInput::InvalidMaxDeltaTime(self.max_delta_time));
        }
        Ok(())
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: DEFAULT_FRICTION,
            air_resistance: DEFAULT_AIR_RESISTANCE,
            max_delta_time: DEFAULT_MAX_DELTA_TIME,
            reset_when_reached_limit: true,
            initial_velocity: 0.0,
            initial_distance: 0.0,
            sections: Vec::new(),
        }
    }
}
