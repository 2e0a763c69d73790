//! Numeric primitives and point-mass motion along a track.
//!
//! Nothing here knows how curves are built; the motion integrator rides
//! anything implementing [`TrackPath`].

mod frame;
mod math;
mod motion;
mod physics_params;
mod section;
mod state;
mod transform;

pub mod physics;

pub use frame::Frame;
pub use math::{Quaternion, Vector3, Vector4};
pub use motion::{placement, step_motion, MotionSimulation, TrackPath};
pub use physics::{
    wrap_distance, DEFAULT_AIR_RESISTANCE, DEFAULT_FRICTION, DEFAULT_MAX_DELTA_TIME,
    EPSILON, GRAVITY, MAX_TICK,
};
pub use physics_params::SimulationParams;
pub use section::{section_acceleration, AccelerationSection};
pub use state::SimulationState;
pub use transform::Transform;
