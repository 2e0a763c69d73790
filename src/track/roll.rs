use std::f64::consts::{PI, TAU};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

use super::cubic::ClampedCubicSpline;
use super::curve::Curve;
use super::search::{find_bounding_indices, split_by_strict};
use super::segments::arc_length_at_offset;

/// Authored bank angle at a logical track position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollPoint {
    /// Logical position along the track, `segment + fraction`.
    pub position: f64,
    pub roll_degrees: f64,
    /// Measure the existing bank against world z instead of world y, for
    /// points on vertical track.
    pub vertical: bool,
    /// Hard boundary: no smoothing across this point.
    pub strict: bool,
}

impl RollPoint {
    pub fn new(position: f64, roll_degrees: f64) -> Self {
        Self {
            position,
            roll_degrees,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollSample {
    pub arc_length: f64,
    /// Unwrapped roll in radians.
    pub angle: f64,
}

/// Roll angle as a function of arc length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollCurve {
    pub samples: Vec<RollSample>,
}

impl RollCurve {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn angle_at(&self, arc_length: f64) -> f64 {
        let Some((i, j)) = find_bounding_indices(&self.samples, arc_length, |s| s.arc_length) else {
            return self.samples.first().map_or(0.0, |s| s.angle);
        };
        let (left, right) = (self.samples[i], self.samples[j]);
        let span = right.arc_length - left.arc_length;
        if span <= f64::EPSILON {
            return left.angle;
        }
        let t = ((arc_length - left.arc_length) / span).clamp(0.0, 1.0);
        left.angle + (right.angle - left.angle) * t
    }
}

/// Builds a smooth roll curve over `curve` from authored roll points.
///
/// Each point's roll is the authored angle on top of the bank the base
/// curve already has there. Consecutive values are unwrapped so the
/// spline never swings through the long way around.
pub fn build_roll_curve(
    points: &[RollPoint],
    curve: &Curve,
    resolution: f64,
) -> Result<RollCurve, InvalidInput> {
    if !(resolution > 0.0 && resolution.is_finite()) {
        return Err(InvalidInput::InvalidResolution(resolution));
    }
    if let Some(index) = points
        .iter()
        .position(|p| !p.position.is_finite() || !p.roll_degrees.is_finite())
    {
        return Err(InvalidInput::NonFiniteRollPoint { index });
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut unwrap = Unwrap::default();
    let mut samples = Vec::new();

    for section in split_by_strict(&sorted, |p| p.strict) {
        let mut knots: Vec<(f64, f64)> = Vec::with_capacity(section.len());
        for point in section {
            let arc_length = arc_length_at_offset(point.position, &curve.segment_offsets);
            let frame = curve.transform_at_arc_length(arc_length).frame;
            let roll = point.roll_degrees.to_radians() + frame.roll_angle(point.vertical);
            knots.push((arc_length, unwrap.next(roll)));
        }

        let mut distinct = knots.clone();
        distinct.dedup_by(|b, a| b.0 <= a.0);

        match ClampedCubicSpline::new(&distinct, 0.0, 0.0) {
            Some(spline) => samples.extend(
                spline
                    .sample(resolution)
                    .into_iter()
                    .map(|(arc_length, angle)| RollSample { arc_length, angle }),
            ),
            None => samples.extend(
                knots
                    .into_iter()
                    .map(|(arc_length, angle)| RollSample { arc_length, angle }),
            ),
        }
    }

    debug!(
        "built roll curve: {} points, {} samples",
        points.len(),
        samples.len()
    );
    Ok(RollCurve { samples })
}

/// Returns a rolled copy of `curve`.
pub fn apply_roll(curve: &Curve, roll: &RollCurve) -> Curve {
    let mut rolled = curve.clone();
    rolled.apply_roll(roll);
    rolled
}

/// Running offset that removes full-turn jumps between consecutive rolls.
#[derive(Debug, Default)]
struct Unwrap {
    last: f64,
    offset: f64,
}

impl Unwrap {
    fn next(&mut self, roll: f64) -> f64 {
        let delta = roll - self.last;
        self.last = roll;
        if delta.abs() >= PI {
            self.offset += if delta > 0.0 { -TAU } else { TAU };
        }
        roll + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Vector3;
    use approx::assert_relative_eq;

    fn straight(length: f64) -> Curve {
        Curve::from_points(&[Vector3::ZERO, Vector3::new(length, 0.0, 0.0)])
    }

    fn assert_continuous(roll: &RollCurve) {
        for pair in roll.samples.windows(2) {
            assert!(
                (pair[1].angle - pair[0].angle).abs() < PI,
                "jump between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_empty_roll_curve_is_zero() {
        let roll = RollCurve::default();
        assert!(roll.is_empty());
        assert_eq!(roll.angle_at(3.0), 0.0);
    }

    #[test]
    fn test_roll_passes_through_points() {
        let curve = straight(30.0);
        let points = [
            RollPoint::new(0.0, 0.0),
            RollPoint::new(0.5, 45.0),
            RollPoint::new(1.0, 0.0),
        ];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();

        assert_relative_eq!(roll.angle_at(0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(roll.angle_at(15.0), PI / 4.0, epsilon = 1e-3);
        assert_relative_eq!(roll.angle_at(30.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_increasing_roll_stays_continuous() {
        let curve = straight(30.0);
        let points = [
            RollPoint::new(0.0, 0.0),
            RollPoint::new(0.5, 170.0),
            RollPoint::new(1.0, 190.0),
        ];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();

        assert!(roll.len() > 3);
        assert_continuous(&roll);
        assert_relative_eq!(roll.angle_at(30.0), 190f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_wraparound_is_unwrapped() {
        let curve = straight(30.0);
        let points = [RollPoint::new(0.0, 170.0), RollPoint::new(1.0, -170.0)];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();

        assert_continuous(&roll);
        assert_relative_eq!(roll.angle_at(30.0), 190f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_points_are_sorted_by_position() {
        let curve = straight(10.0);
        let points = [RollPoint::new(1.0, 20.0), RollPoint::new(0.0, 10.0)];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();

        assert_relative_eq!(roll.angle_at(0.0), 10f64.to_radians(), epsilon = 1e-9);
        assert_relative_eq!(roll.angle_at(10.0), 20f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_strict_point_splits_sections() {
        let curve = straight(20.0);
        let points = [
            RollPoint::new(0.0, 0.0),
            RollPoint {
                strict: true,
                ..RollPoint::new(0.5, 90.0)
            },
            RollPoint::new(1.0, 90.0),
        ];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();

        // The second section is flat at the shared boundary value.
        assert_relative_eq!(roll.angle_at(15.0), PI / 2.0, epsilon = 1e-9);
        assert_relative_eq!(roll.angle_at(10.0), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_point_is_constant() {
        let curve = straight(10.0);
        let roll = build_roll_curve(&[RollPoint::new(0.3, 30.0)], &curve, 4.0).unwrap();

        assert_eq!(roll.len(), 1);
        assert_relative_eq!(roll.angle_at(0.0), 30f64.to_radians());
        assert_relative_eq!(roll.angle_at(9.0), 30f64.to_radians());
    }

    #[test]
    fn test_rejects_bad_input() {
        let curve = straight(10.0);
        assert_eq!(
            build_roll_curve(&[RollPoint::new(f64::NAN, 0.0)], &curve, 4.0),
            Err(InvalidInput::NonFiniteRollPoint { index: 0 })
        );
        assert_eq!(
            build_roll_curve(&[], &curve, 0.0),
            Err(InvalidInput::InvalidResolution(0.0))
        );
    }

    #[test]
    fn test_roll_includes_existing_bank() {
        let mut curve = straight(10.0);
        let bank = RollCurve {
            samples: vec![RollSample {
                arc_length: 0.0,
                angle: 0.5,
            }],
        };
        curve.apply_roll(&bank);

        // The base frame's own bank is folded into the roll values.
        let roll = build_roll_curve(&[RollPoint::new(0.0, 0.0), RollPoint::new(1.0, 0.0)], &curve, 4.0)
            .unwrap();
        assert_relative_eq!(roll.angle_at(5.0), curve.nodes[0].transform.frame.roll_angle(false), epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_point_measures_bank_against_world_z() {
        // Straight up: front is +y, up faces -z.
        let curve = Curve::from_points(&[Vector3::ZERO, Vector3::new(0.0, 10.0, 0.0)]);
        let frame = curve.nodes[0].transform.frame;
        assert_relative_eq!(frame.front.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.up.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.roll_angle(true).abs(), PI, epsilon = 1e-9);

        let points = [
            RollPoint {
                vertical: true,
                ..RollPoint::new(0.0, -90.0)
            },
            RollPoint {
                vertical: true,
                ..RollPoint::new(1.0, -90.0)
            },
        ];
        let roll = build_roll_curve(&points, &curve, 4.0).unwrap();
        assert_continuous(&roll);
        assert_relative_eq!(roll.angle_at(5.0), PI / 2.0, epsilon = 1e-9);

        let banked = apply_roll(&curve, &roll).transform_at_arc_length(5.0).frame;
        assert_relative_eq!(banked.front.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(banked.left.z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(banked.up.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quarter_roll_banks_track() {
        let curve = straight(10.0);
        let roll = build_roll_curve(&[RollPoint::new(0.0, 90.0), RollPoint::new(1.0, 90.0)], &curve, 4.0)
            .unwrap();
        let banked = apply_roll(&curve, &roll);

        let frame = banked.transform_at_arc_length(5.0).frame;
        assert_relative_eq!(frame.front.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.left.y, -1.0, epsilon = 1e-9);
        assert_relative_eq!(frame.up.z, -1.0, epsilon = 1e-9);
        // The unrolled curve is left untouched.
        assert_relative_eq!(curve.nodes[0].transform.frame.up.y, 1.0, epsilon = 1e-12);
    }
}
