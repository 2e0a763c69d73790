use serde::{Deserialize, Serialize};

/// Zone of extra acceleration along the track, such as a launch or a brake.
///
/// The zone drives while the position lies in `[from_arc_length,
/// to_arc_length]` and the velocity has not yet reached the bound in the
/// direction the zone pushes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationSection {
    pub from_arc_length: f64,
    pub to_arc_length: f64,
    pub acceleration: f64,
    pub max_velocity: Option<f64>,
    pub min_velocity: Option<f64>,
}

impl AccelerationSection {
    pub fn new(from_arc_length: f64, to_arc_length: f64, acceleration: f64) -> Self {
        Self {
            from_arc_length,
            to_arc_length,
            acceleration,
            max_velocity: None,
            min_velocity: None,
        }
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = Some(max_velocity);
        self
    }

    pub fn with_min_velocity(mut self, min_velocity: f64) -> Self {
        self.min_velocity = Some(min_velocity);
        self
    }

    pub fn is_active(&self, distance: f64, velocity: f64) -> bool {
        if distance < self.from_arc_length || distance > self.to_arc_length {
            return false;
        }
        if self.max_velocity.is_some_and(|max| velocity >= max) {
            return false;
        }
        if self.min_velocity.is_some_and(|min| velocity <= min) {
            return false;
        }
        true
    }
}

impl Default for AccelerationSection {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Extra acceleration from the first active section, or zero.
pub fn section_acceleration(sections: &[AccelerationSection], distance: f64, velocity: f64) -> f64 {
    sections
        .iter()
        .find(|section| section.is_active(distance, velocity))
        .map_or(0.0, |section| section.acceleration)
}
