use serde::{Deserialize, Serialize};

/// Point mass moving along a curve.
///
/// Velocity and distance are signed; the distance may leave
/// `[0, total_arc_length]` between steps.
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationState {
    pub velocity: f64,
    pub distance_traveled: f64,
    /// Net acceleration of the last integrated chunk.
    pub acceleration: f64,
}

impl SimulationState {
    pub const fn new(velocity: f64, distance_traveled: f64) -> Self {
        Self {
            velocity,
            distance_traveled,
            acceleration: 0.0,
        }
    }
}
