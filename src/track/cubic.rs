use crate::sim::Vector3;

use super::search::{lower_bound, uniform_sample_map};

/// Cubic spline through `(x, y)` knots with prescribed end slopes.
///
/// Piece `i` is `y[i] + b[i] dx + c[i] dx^2 + d[i] dx^3` with
/// `dx = x - x[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedCubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl ClampedCubicSpline {
    /// Solves the tridiagonal system for the piece coefficients.
    ///
    /// Returns `None` unless there are at least two knots with strictly
    /// increasing, finite x.
    pub fn new(knots: &[(f64, f64)], start_slope: f64, end_slope: f64) -> Option<Self> {
        if knots.len() < 2 {
            return None;
        }
        let valid = knots.iter().all(|k| k.0.is_finite() && k.1.is_finite())
            && knots.windows(2).all(|w| w[1].0 > w[0].0);
        if !valid {
            return None;
        }

        let n = knots.len() - 1;
        let x: Vec<f64> = knots.iter().map(|k| k.0).collect();
        let y: Vec<f64> = knots.iter().map(|k| k.1).collect();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope = |i: usize| (y[i + 1] - y[i]) / h[i];

        let mut alpha = vec![0.0; n + 1];
        alpha[0] = 3.0 * (slope(0) - start_slope);
        alpha[n] = 3.0 * (end_slope - slope(n - 1));
        for i in 1..n {
            alpha[i] = 3.0 * (slope(i) - slope(i - 1));
        }

        // Thomas algorithm: forward elimination.
        let mut l = vec![0.0; n + 1];
        let mut mu = vec![0.0; n + 1];
        let mut z = vec![0.0; n + 1];
        l[0] = 2.0 * h[0];
        mu[0] = 0.5;
        z[0] = alpha[0] / l[0];
        for i in 1..n {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }
        l[n] = h[n - 1] * (2.0 - mu[n - 1]);
        z[n] = (alpha[n] - h[n - 1] * z[n - 1]) / l[n];

        // Back substitution.
        let mut b = vec![0.0; n + 1];
        let mut c = vec![0.0; n + 1];
        let mut d = vec![0.0; n + 1];
        c[n] = z[n];
        for j in (0..n).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = slope(j) - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        Some(Self { x, y, b, c, d })
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Outside the knot range the end pieces are extended.
    pub fn evaluate(&self, at: f64) -> f64 {
        let last_piece = self.x.len() - 2;
        let i = lower_bound(&self.x, at, |v| *v).saturating_sub(1).min(last_piece);
        let dx = at - self.x[i];
        self.y[i] + self.b[i] * dx + self.c[i] * dx * dx + self.d[i] * dx * dx * dx
    }

    /// Samples over the knot range at `resolution` samples per unit of x.
    pub fn sample(&self, resolution: f64) -> Vec<(f64, f64)> {
        let (from, to) = self.domain();
        uniform_sample_map(from, to, resolution, |at, _| (at, self.evaluate(at)))
    }
}

/// Interpolating 3D curve through points: one clamped cubic spline per
/// axis over cumulative chord length.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordCubicCurve {
    /// Chord-length parameter of each distinct point.
    pub knots: Vec<f64>,
    x: ClampedCubicSpline,
    y: ClampedCubicSpline,
    z: ClampedCubicSpline,
}

impl ChordCubicCurve {
    /// End tangents default to the first and last chord directions.
    /// Consecutive duplicate points are skipped; fewer than two distinct
    /// points give `None`.
    pub fn new(points: &[Vector3], tangents: Option<(Vector3, Vector3)>) -> Option<Self> {
        let mut distinct: Vec<Vector3> = Vec::with_capacity(points.len());
        let mut knots = Vec::with_capacity(points.len());
        for &point in points {
            match distinct.last() {
                None => knots.push(0.0),
                Some(&prev) => {
                    let chord = point.distance(prev);
                    if chord <= f64::EPSILON {
                        continue;
                    }
                    knots.push(knots[knots.len() - 1] + chord);
                }
            }
            distinct.push(point);
        }
        if distinct.len() < 2 {
            return None;
        }

        let (start, end) = tangents.unwrap_or_else(|| {
            let n = distinct.len();
            (
                (distinct[1] - distinct[0]).normalize(),
                (distinct[n - 1] - distinct[n - 2]).normalize(),
            )
        });
        let axis = |pick: fn(Vector3) -> f64| {
            let pairs: Vec<(f64, f64)> = knots
                .iter()
                .zip(&distinct)
                .map(|(&s, &p)| (s, pick(p)))
                .collect();
            ClampedCubicSpline::new(&pairs, pick(start), pick(end))
        };

        let x = axis(|v| v.x)?;
        let y = axis(|v| v.y)?;
        let z = axis(|v| v.z)?;
        Some(Self { knots, x, y, z })
    }

    pub fn length(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    pub fn evaluate(&self, s: f64) -> Vector3 {
        Vector3::new(self.x.evaluate(s), self.y.evaluate(s), self.z.evaluate(s))
    }

    /// Index of the piece containing `s`; a knot starts its piece.
    pub fn segment_at(&self, s: f64) -> usize {
        let i = lower_bound(&self.knots, s, |v| *v);
        let on_knot = i < self.knots.len() && self.knots[i] == s;
        let segment = if on_knot { i } else { i.saturating_sub(1) };
        segment.min(self.knots.len() - 1)
    }
}
