//! Non-uniform rational B-splines.
//!
//! Control points carry their weight in `w`. Evaluation blends the
//! weighted points with de Boor's algorithm and projects the result back
//! by dividing by the blended weight.

use crate::sim::{Vector3, Vector4};

use super::curve::Curve;
use super::search::{lower_bound, uniform_sample_map};

/// Knot vector layouts. Clamped ends pass through the end control point;
/// open ends run on into the neighbouring span, which is how closed loops
/// and joins between strict sections stay smooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnotVector {
    Clamped,
    Closed,
    LeftClampedRightOpen,
    LeftOpenRightClamped,
    Uniform,
}

impl KnotVector {
    /// `point_count + degree + 1` knots; the domain always starts at 0
    /// except for `Uniform`, which starts at `degree`.
    pub fn build(self, point_count: usize, degree: usize) -> Vec<f64> {
        let count = point_count + degree + 1;
        let end = point_count.saturating_sub(degree) as f64;
        (0..count)
            .map(|i| {
                let open = i as f64 - degree as f64;
                let clamped_left = i <= degree;
                let clamped_right = i + degree + 1 >= count;
                match self {
                    Self::Uniform => i as f64,
                    Self::Closed => open,
                    Self::Clamped if clamped_left => 0.0,
                    Self::Clamped if clamped_right => end,
                    Self::Clamped => open,
                    Self::LeftClampedRightOpen if clamped_left => 0.0,
                    Self::LeftClampedRightOpen => open,
                    Self::LeftOpenRightClamped if clamped_right => end,
                    Self::LeftOpenRightClamped => open,
                }
            })
            .collect()
    }
}

/// Degree used for `point_count` control points.
pub fn degree_for(point_count: usize, max_degree: usize) -> usize {
    point_count.saturating_sub(1).min(max_degree.max(1))
}

/// Parameter range the curve is defined over.
pub fn domain(knots: &[f64], degree: usize) -> (f64, f64) {
    (knots[degree], knots[knots.len() - degree - 1])
}

/// Non-empty knot spans inside the domain.
pub fn intervals(knots: &[f64], degree: usize) -> Vec<(f64, f64)> {
    knots[degree..knots.len() - degree]
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| (w[0], w[1]))
        .collect()
}

/// Point at parameter `t`.
///
/// `points` must hold at least `degree + 1` entries and `knots`
/// `points.len() + degree + 1`.
pub fn evaluate(points: &[Vector4], knots: &[f64], degree: usize, t: f64) -> Vector3 {
    let span = lower_bound(knots, t, |k| *k)
        .saturating_sub(1)
        .clamp(degree, knots.len() - degree - 2);

    let mut work: Vec<Vector4> = (0..=degree)
        .map(|j| points[j + span - degree].weighted())
        .collect();

    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = j + span - degree;
            let denominator = knots[i + degree + 1 - r] - knots[i];
            let alpha = if denominator.abs() < f64::EPSILON {
                0.0
            } else {
                (t - knots[i]) / denominator
            };
            work[j] = work[j - 1].lerp(work[j], alpha);
        }
    }
    work[degree].project()
}

/// Chord length over 8 samples of `[min, max]`. Only sizes the sampling.
pub fn estimate_length(points: &[Vector4], knots: &[f64], degree: usize, min: f64, max: f64) -> f64 {
    let positions = uniform_sample_map(0.0, 1.0, 8.0, |_, t| {
        evaluate(points, knots, degree, min + (max - min) * t)
    });
    positions.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Samples the spline over `points` into `curve`, tagging nodes with
/// `base_segment` plus the knot interval index.
///
/// Returns the number of knot intervals sampled.
pub fn extend_curve(
    curve: &mut Curve,
    points: &[Vector4],
    knot_vector: KnotVector,
    resolution: f64,
    max_degree: usize,
    base_segment: u32,
) -> usize {
    match points {
        [] => return 0,
        [only] => {
            curve.insert_position(only.project(), base_segment);
            return 0;
        }
        _ => {}
    }

    let degree = degree_for(points.len(), max_degree);
    let knots = knot_vector.build(points.len(), degree);
    let spans = intervals(&knots, degree);

    for (index, &(min, max)) in spans.iter().enumerate() {
        let length = estimate_length(points, &knots, degree, min, max);
        let density = length * resolution / (max - min);
        let segment = base_segment + index as u32;
        curve.extend_uniform_sample(min, max, density, |at, t| {
            let tag = if t >= 1.0 { segment + 1 } else { segment };
            (evaluate(points, &knots, degree, at), tag)
        });
    }
    spans.len()
}
