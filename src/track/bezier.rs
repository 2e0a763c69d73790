use crate::sim::Vector3;

/// Bezier curve of any degree by repeated linear interpolation.
pub fn de_casteljau(points: &[Vector3], t: f64) -> Vector3 {
    let mut work = points.to_vec();
    for level in (1..work.len()).rev() {
        for i in 0..level {
            work[i] = work[i].lerp(work[i + 1], t);
        }
    }
    work.first().copied().unwrap_or(Vector3::ZERO)
}

/// Cubic Bezier in Bernstein form.
pub fn cubic_bezier(p0: Vector3, p1: Vector3, p2: Vector3, p3: Vector3, t: f64) -> Vector3 {
    let s = 1.0 - t;
    let b0 = s * s * s;
    let b1 = 3.0 * s * s * t;
    let b2 = 3.0 * s * t * t;
    let b3 = t * t * t;
    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// Evaluates the Bezier curve over `points`, taking the cubic fast path
/// for four control points.
pub fn evaluate(points: &[Vector3], t: f64) -> Vector3 {
    match points {
        [p0, p1, p2, p3] => cubic_bezier(*p0, *p1, *p2, *p3, t),
        _ => de_casteljau(points, t),
    }
}

/// Chord length over 8 evenly spaced samples. Only sizes the sampling.
pub fn estimate_length(points: &[Vector3]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let mut last = first;
    let mut length = 0.0;
    for i in (0..15).step_by(2) {
        let position = evaluate(points, i as f64 / 14.0);
        length += position.distance(last);
        last = position;
    }
    length
}
