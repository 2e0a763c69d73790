use log::debug;

use super::math::Vector3;
use super::physics::{
    energy_loss, integrate_velocity, tangential_gravity, wrap_distance, DEFAULT_MAX_DELTA_TIME,
    EPSILON, MAX_TICK,
};
use super::physics_params::SimulationParams;
use super::section::section_acceleration;
use super::state::SimulationState;
use super::transform::Transform;

/// Arc-length parameterized path a point mass can ride.
pub trait TrackPath {
    fn total_arc_length(&self) -> f64;

    fn transform_at(&self, arc_length: f64) -> Transform;

    fn front_direction_at(&self, arc_length: f64) -> Vector3 {
        self.transform_at(arc_length).front_direction()
    }
}

/// Advances `state` by `delta_time` seconds along `path`.
///
/// Ticks that are not positive or longer than a second are discarded. The
/// remaining time is integrated in chunks of at most `max_delta_time`.
/// A mass at rest on a grade too shallow to overcome friction stays put.
pub fn step_motion<P: TrackPath + ?Sized>(
    state: SimulationState,
    path: &P,
    params: &SimulationParams,
    delta_time: f64,
) -> SimulationState {
    if !(delta_time > 0.0 && delta_time <= MAX_TICK) {
        debug!("discarding simulation tick of {delta_time}s");
        return state;
    }

    let max_chunk = if params.validate().is_ok() {
        params.max_delta_time
    } else {
        DEFAULT_MAX_DELTA_TIME
    };
    let total = path.total_arc_length();
    let initial = SimulationState::new(params.initial_velocity, params.initial_distance);

    let mut state = state;
    let mut remaining = delta_time;
    while remaining > EPSILON {
        let dt = remaining.min(max_chunk);
        remaining -= dt;

        let distance = state.distance_traveled;
        if params.reset_when_reached_limit && (distance < 0.0 || distance > total) {
            debug!("distance {distance} outside [0, {total}], resetting");
            state = initial;
            continue;
        }

        let front = path.front_direction_at(distance);
        let driving = tangential_gravity(front, params.gravity)
            + section_acceleration(&params.sections, distance, state.velocity);
        let loss = energy_loss(
            state.velocity,
            params.gravity,
            params.friction,
            params.air_resistance,
        );
        let (velocity, acceleration) = integrate_velocity(state.velocity, driving, loss, dt);

        state.velocity = velocity;
        state.acceleration = acceleration;
        state.distance_traveled += velocity * dt;

        if !params.reset_when_reached_limit {
            state.distance_traveled = wrap_distance(state.distance_traveled, total);
        }
    }
    state
}

/// Transform at the state's distance, clamped to the path.
pub fn placement<P: TrackPath + ?Sized>(state: &SimulationState, path: &P) -> Transform {
    let total = path.total_arc_length();
    path.transform_at(state.distance_traveled.clamp(0.0, total.max(0.0)))
}

/// Owned simulation for one rider: parameters plus current state.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSimulation {
    pub params: SimulationParams,
    pub state: SimulationState,
}

impl MotionSimulation {
    pub fn new(params: SimulationParams) -> Self {
        let state = SimulationState::new(params.initial_velocity, params.initial_distance);
        Self { params, state }
    }

    pub fn reset(&mut self) {
        self.state = SimulationState::new(self.params.initial_velocity, self.params.initial_distance);
    }

    /// Steps the state and returns where the rider now sits.
    pub fn advance<P: TrackPath + ?Sized>(&mut self, path: &P, delta_time: f64) -> Transform {
        self.state = step_motion(self.state, path, &self.params, delta_time);
        placement(&self.state, path)
    }
}

impl Default for MotionSimulation {
    fn default() -> Self {
        Self::new(SimulationParams::default())
    }
}
