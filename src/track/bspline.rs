use crate::sim::{Vector3, Vector4};

use super::curve::Curve;
use super::nurbs::{self, KnotVector};
use super::search::uniform_sample_map;

/// How the ends of a uniform cubic B-spline are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// End points tripled so the curve starts and ends on them.
    Clamped,
    /// No padding; the curve starts and ends inside the hull.
    Open,
    /// Wraps around so the end meets the start smoothly.
    Closed,
}

impl Boundary {
    /// Control points with the padding the boundary needs.
    pub fn pad(self, points: &[Vector4]) -> Vec<Vector4> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Vec::new();
        };
        match self {
            Self::Open => points.to_vec(),
            Self::Clamped => [first, first]
                .into_iter()
                .chain(points.iter().copied())
                .chain([last, last])
                .collect(),
            Self::Closed => {
                let second = points.get(1).copied().unwrap_or(first);
                std::iter::once(last)
                    .chain(points.iter().copied())
                    .chain([first, second])
                    .collect()
            }
        }
    }
}

/// Point on the window of four control points starting at `window`,
/// `t` in `[0, 1]`.
pub fn evaluate(points: &[Vector4], window: usize, t: f64) -> Vector3 {
    let s = 1.0 - t;
    let t2 = t * t;
    let t3 = t2 * t;
    let basis = [
        s * s * s / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ];
    let blended = points[window..window + 4]
        .iter()
        .zip(basis)
        .fold(Vector4::new(0.0, 0.0, 0.0, 0.0), |acc, (p, b)| acc + p.weighted() * b);
    blended.project()
}

/// Chord length of one window over 8 samples. Only sizes the sampling.
pub fn estimate_length(points: &[Vector4], window: usize) -> f64 {
    let positions = uniform_sample_map(0.0, 1.0, 8.0, |_, t| evaluate(points, window, t));
    positions.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Samples the spline over `points` into `curve` and returns the number
/// of logical segments it covers.
///
/// Open splines with fewer than four points fall back to a clamped NURBS
/// of reduced degree.
pub fn extend_curve(
    curve: &mut Curve,
    points: &[Vector4],
    boundary: Boundary,
    resolution: f64,
    base_segment: u32,
) -> usize {
    let m = points.len();
    if m < 2 {
        if let Some(only) = points.first() {
            curve.insert_position(only.project(), base_segment);
        }
        return 0;
    }
    if boundary == Boundary::Open && m < 4 {
        return nurbs::extend_curve(curve, points, KnotVector::Clamped, resolution, 3, base_segment);
    }

    let padded = boundary.pad(points);
    let windows = padded.len() - 3;
    let last_segment = m as i64 - 2;

    for window in 0..windows {
        let length = estimate_length(&padded, window);
        curve.extend_uniform_sample(0.0, 1.0, length * resolution, |_, t| {
            let step = window as i64 + t.floor() as i64;
            let local = match boundary {
                Boundary::Clamped => (step - 1).clamp(0, last_segment),
                Boundary::Open | Boundary::Closed => step,
            };
            (evaluate(&padded, window, t), base_segment + local as u32)
        });
    }

    match boundary {
        Boundary::Clamped => m - 1,
        Boundary::Open | Boundary::Closed => windows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(coords: &[(f64, f64, f64)]) -> Vec<Vector4> {
        coords
            .iter()
            .map(|&(x, y, z)| Vector4::new(x, y, z, 1.0))
            .collect()
    }

    fn zigzag() -> Vec<Vector4> {
        points(&[
            (0.0, 0.0, 0.0),
            (10.0, 5.0, 0.0),
            (20.0, 0.0, 0.0),
            (30.0, 5.0, 0.0),
            (40.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_basis_is_partition_of_unity() {
        let p = points(&[(1.0, 1.0, 1.0), (1.0, 1.0, 1.0), (1.0, 1.0, 1.0), (1.0, 1.0, 1.0)]);
        for i in 0..=10 {
            let q = evaluate(&p, 0, i as f64 / 10.0);
            assert_relative_eq!(q.x, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_padding() {
        let p = zigzag();
        assert_eq!(Boundary::Open.pad(&p).len(), 5);
        assert_eq!(Boundary::Clamped.pad(&p).len(), 9);
        let closed = Boundary::Closed.pad(&p);
        assert_eq!(closed.len(), 8);
        assert_eq!(closed[0], p[4]);
        assert_eq!(closed[7], p[1]);
        assert!(Boundary::Clamped.pad(&[]).is_empty());
    }

    #[test]
    fn test_clamped_hits_end_points() {
        let p = zigzag();
        let mut curve = Curve::new();
        let segments = extend_curve(&mut curve, &p, Boundary::Clamped, 4.0, 0);

        assert_eq!(segments, 4);
        let start = curve.nodes[0].transform.position;
        let end = curve.nodes[curve.len() - 1].transform.position;
        assert_relative_eq!(start.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(end.x, 40.0, epsilon = 1e-9);
        assert_eq!(curve.nodes[0].segment_index, 0);
        assert_eq!(curve.nodes[curve.len() - 1].segment_index, 3);
    }

    #[test]
    fn test_open_stays_inside_hull() {
        let p = zigzag();
        let mut curve = Curve::new();
        let segments = extend_curve(&mut curve, &p, Boundary::Open, 4.0, 2);

        assert_eq!(segments, 2);
        let start = curve.nodes[0].transform.position;
        assert!(start.x > 0.0);
        assert_eq!(curve.nodes[0].segment_index, 2);
        assert_eq!(curve.nodes[curve.len() - 1].segment_index, 4);
    }

    #[test]
    fn test_closed_returns_to_start() {
        let p = points(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 0.0, 10.0), (0.0, 0.0, 10.0)]);
        let mut curve = Curve::new();
        let segments = extend_curve(&mut curve, &p, Boundary::Closed, 4.0, 0);

        assert_eq!(segments, 4);
        let start = curve.nodes[0].transform.position;
        let end = curve.nodes[curve.len() - 1].transform.position;
        assert_relative_eq!(start.distance(end), 0.0, epsilon = 1e-9);
        assert_eq!(curve.nodes[curve.len() - 1].segment_index, 4);
    }

    #[test]
    fn test_short_open_spline_falls_back() {
        let p = points(&[(0.0, 0.0, 0.0), (5.0, 2.0, 0.0), (10.0, 0.0, 0.0)]);
        let mut curve = Curve::new();
        let segments = extend_curve(&mut curve, &p, Boundary::Open, 4.0, 0);

        assert_eq!(segments, 1);
        let end = curve.nodes[curve.len() - 1].transform.position;
        assert_relative_eq!(end.x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weights_pull_toward_point() {
        let mut p = zigzag();
        let plain = evaluate(&p, 0, 1.0);
        p[1].w = 5.0;
        let heavy = evaluate(&p, 0, 1.0);
        assert!(heavy.y > plain.y);
    }
}
