use super::math::Vector3;

pub const GRAVITY: f64 = 9.81665;
pub const DEFAULT_FRICTION: f64 = 0.03;
pub const DEFAULT_AIR_RESISTANCE: f64 = 2e-5;
/// Largest integration chunk a tick is split into.
pub const DEFAULT_MAX_DELTA_TIME: f64 = 0.08;
/// Ticks longer than this are treated as stalls and discarded.
pub const MAX_TICK: f64 = 1.0;
pub const EPSILON: f64 = 1e-9;

/// Positive modulo of a distance onto a closed loop of `length`.
pub fn wrap_distance(distance: f64, length: f64) -> f64 {
    if length <= 0.0 {
        return 0.0;
    }
    ((distance % length) + length) % length
}

/// Gravity projected onto the tangent of travel.
pub fn tangential_gravity(front: Vector3, gravity: f64) -> f64 {
    front.dot(Vector3::new(0.0, -gravity, 0.0))
}

/// Magnitude of friction plus quadratic air drag at `velocity`.
///
/// # Arguments
/// * `velocity` - Signed speed along the track
/// * `gravity` - Gravitational acceleration, scales rolling friction
/// * `friction` - Rolling friction coefficient
/// * `air_resistance` - Quadratic drag coefficient
pub fn energy_loss(velocity: f64, gravity: f64, friction: f64, air_resistance: f64) -> f64 {
    air_resistance * velocity * velocity + friction * gravity
}

/// Advances a velocity by one chunk of semi-implicit Euler under a driving
/// acceleration and losses that oppose motion.
///
/// Losses never reverse the direction of travel within a chunk: if they
/// alone would flip the sign the velocity settles at zero. From rest,
/// friction holds the mass until the driving acceleration exceeds it.
///
/// Returns `(velocity, net_acceleration)`.
pub fn integrate_velocity(velocity: f64, driving: f64, loss: f64, dt: f64) -> (f64, f64) {
    if velocity == 0.0 {
        let net = if driving.abs() <= loss {
            0.0
        } else {
            driving - loss * driving.signum()
        };
        return (net * dt, net);
    }

    let direction = velocity.signum();
    let acceleration = driving - direction * loss;
    let next = velocity + acceleration * dt;

    // Crossed zero without enough opposing drive to overcome friction.
    if next.signum() != direction && driving * direction >= -loss {
        return (0.0, -velocity / dt);
    }
    (next, acceleration)
}
