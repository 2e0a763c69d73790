//! Curve construction from control vertices.
//!
//! Vertices are split into sections at strict vertices and each section
//! is sampled into one running [`Curve`], so frames propagate across the
//! joins. Node tags count knot intervals across the whole track and are
//! expanded into logical vertex-to-vertex offsets section by section.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::sim::{Vector3, Vector4};

use super::bezier;
use super::bspline::{self, Boundary};
use super::cubic::ChordCubicCurve;
use super::curve::Curve;
use super::nurbs::{self, KnotVector};
use super::search::split_by_strict;
use super::segments::{interval_offsets, split_intervals};

/// Control vertex as handed over by a track importer or editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlVertex {
    /// Position with the NURBS weight in `w`.
    pub position: Vector4,
    /// Hard section boundary.
    pub strict: bool,
}

impl ControlVertex {
    pub fn new(position: Vector4) -> Self {
        Self {
            position,
            strict: false,
        }
    }

    pub fn strict(position: Vector4) -> Self {
        Self {
            position,
            strict: true,
        }
    }

    fn location(&self) -> Vector3 {
        self.position.xyz()
    }
}

impl From<Vector3> for ControlVertex {
    fn from(position: Vector3) -> Self {
        Self::new(position.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMethod {
    Linear,
    Bezier,
    ClampedCubic,
    #[serde(rename = "bspline")]
    BSpline,
    #[default]
    Nurbs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    /// Samples per unit of estimated length.
    pub resolution: f64,
    /// Join the end of the track back to its start.
    pub closed: bool,
    /// Upper bound on the NURBS degree.
    pub max_degree: usize,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            resolution: 20.0,
            closed: false,
            max_degree: 3,
        }
    }
}

/// Builds an arc-length indexed curve through `vertices`.
pub fn build_curve(
    vertices: &[ControlVertex],
    method: CurveMethod,
    options: &CurveOptions,
) -> Result<Curve, InvalidInput> {
    validate(vertices, options)?;

    let mut builder = Builder::new(*options);
    if let [only] = vertices {
        builder.curve.insert_position(only.location(), 0);
        builder.curve.segment_offsets.push(0.0);
        return Ok(builder.curve);
    }

    match method {
        CurveMethod::Linear => builder.linear(&closing(vertices, options.closed)),
        CurveMethod::Bezier => builder.bezier(&closing(vertices, options.closed)),
        CurveMethod::ClampedCubic => builder.clamped_cubic(vertices),
        CurveMethod::BSpline => builder.bspline(vertices),
        CurveMethod::Nurbs => builder.nurbs(vertices),
    }

    let curve = builder.curve;
    debug!(
        "built {:?} curve: {} vertices, {} nodes, length {:.3}",
        method,
        vertices.len(),
        curve.len(),
        curve.total_arc_length()
    );
    Ok(curve)
}

fn validate(vertices: &[ControlVertex], options: &CurveOptions) -> Result<(), InvalidInput> {
    if vertices.is_empty() {
        return Err(InvalidInput::NoControlPoints);
    }
    if !(options.resolution > 0.0 && options.resolution.is_finite()) {
        return Err(InvalidInput::InvalidResolution(options.resolution));
    }
    for (index, vertex) in vertices.iter().enumerate() {
        if !vertex.position.is_finite() {
            return Err(InvalidInput::NonFiniteControlPoint { index });
        }
        if vertex.position.w <= 0.0 {
            return Err(InvalidInput::InvalidWeight {
                index,
                weight: vertex.position.w,
            });
        }
    }
    Ok(())
}

/// Vertices with the first one repeated at the end for closed tracks.
fn closing(vertices: &[ControlVertex], closed: bool) -> Vec<ControlVertex> {
    let mut out = vertices.to_vec();
    if let (true, Some(&first)) = (closed, vertices.first()) {
        out.push(ControlVertex {
            strict: false,
            ..first
        });
    }
    out
}

fn has_strict(vertices: &[ControlVertex]) -> bool {
    split_by_strict(vertices, |v| v.strict).len() > 1
}

fn locations(vertices: &[ControlVertex]) -> Vec<Vector3> {
    vertices.iter().map(ControlVertex::location).collect()
}

fn weighted(vertices: &[ControlVertex]) -> Vec<Vector4> {
    vertices.iter().map(|v| v.position).collect()
}

/// Running curve plus the sampling options.
struct Builder {
    curve: Curve,
    options: CurveOptions,
}

impl Builder {
    fn new(options: CurveOptions) -> Self {
        Self {
            curve: Curve::new(),
            options,
        }
    }

    /// Samples one section with `sample(curve, base_tag)` and appends its
    /// offsets expanded to `logical` segments.
    fn section<F>(&mut self, logical: usize, clamped_start: bool, clamped_end: bool, sample: F)
    where
        F: FnOnce(&mut Curve, u32),
    {
        let first_node = self.curve.nodes.len().saturating_sub(1);
        let base = self.curve.nodes.last().map_or(0, |node| node.segment_index);
        let before = self.curve.len();

        sample(&mut self.curve, base);

        if self.curve.len() == before {
            warn!("track section of {logical} segments yielded no geometry");
        }
        let intervals = interval_offsets(&self.curve.nodes[first_node..]);
        let offsets = split_intervals(&intervals, logical, clamped_start, clamped_end);
        let skip = usize::from(!self.curve.segment_offsets.is_empty());
        self.curve.segment_offsets.extend(offsets.into_iter().skip(skip));
    }

    fn linear(&mut self, vertices: &[ControlVertex]) {
        for section in split_by_strict(vertices, |v| v.strict) {
            self.section(section.len() - 1, true, true, |curve, base| {
                for (i, vertex) in section.iter().enumerate() {
                    curve.insert_position(vertex.location(), base + i as u32);
                }
            });
        }
    }

    fn bezier(&mut self, vertices: &[ControlVertex]) {
        let resolution = self.options.resolution;
        for section in split_by_strict(vertices, |v| v.strict) {
            let points = locations(section);
            let last_segment = points.len() as u32 - 1;
            self.section(points.len() - 1, true, true, |curve, base| {
                let length = bezier::estimate_length(&points);
                curve.extend_uniform_sample(0.0, length, resolution, |_, t| {
                    let local = ((t * last_segment as f64).floor() as u32).min(last_segment);
                    (bezier::evaluate(&points, t), base + local)
                });
            });
        }
    }

    fn clamped_cubic(&mut self, vertices: &[ControlVertex]) {
        let closed = self.options.closed;
        let resolution = self.options.resolution;
        let vertices = closing(vertices, closed);
        let seamless = closed && !has_strict(&vertices);

        // A seamless loop leaves and re-enters the first vertex along the
        // same direction.
        let tangents = if seamless {
            let n = vertices.len();
            let through = (vertices[1].location() - vertices[n - 2].location()).normalize();
            Some((through, through))
        } else {
            None
        };

        for section in split_by_strict(&vertices, |v| v.strict) {
            let points = locations(section);
            self.section(points.len() - 1, true, true, |curve, base| {
                match ChordCubicCurve::new(&points, tangents) {
                    Some(spline) => curve.extend_uniform_sample(0.0, spline.length(), resolution, |s, _| {
                        (spline.evaluate(s), base + spline.segment_at(s) as u32)
                    }),
                    None => {
                        curve.insert_position(points[0], base);
                    }
                }
            });
        }
    }

    fn bspline(&mut self, vertices: &[ControlVertex]) {
        let resolution = self.options.resolution;
        let closed = self.options.closed;
        if closed && !has_strict(&closing(vertices, true)) {
            let points = weighted(vertices);
            let logical = points.len();
            self.section(logical, false, false, |curve, base| {
                bspline::extend_curve(curve, &points, Boundary::Closed, resolution, base);
            });
            return;
        }

        let vertices = closing(vertices, closed);
        for section in split_by_strict(&vertices, |v| v.strict) {
            let points = weighted(section);
            self.section(points.len() - 1, true, true, |curve, base| {
                bspline::extend_curve(curve, &points, Boundary::Clamped, resolution, base);
            });
        }
    }

    fn nurbs(&mut self, vertices: &[ControlVertex]) {
        let CurveOptions {
            resolution,
            closed,
            max_degree,
        } = self.options;

        if !closed {
            for section in split_by_strict(vertices, |v| v.strict) {
                let points = weighted(section);
                self.section(points.len() - 1, true, true, |curve, base| {
                    nurbs::extend_curve(curve, &points, KnotVector::Clamped, resolution, max_degree, base);
                });
            }
            return;
        }

        let padded = wrap_padding(vertices);
        let sections = split_by_strict(&padded, |v| v.strict);
        if sections.len() == 1 {
            let points = weighted(&padded);
            self.section(vertices.len(), false, false, |curve, base| {
                nurbs::extend_curve(curve, &points, KnotVector::Closed, resolution, max_degree, base);
            });
            return;
        }

        let last = sections.len() - 1;
        for (i, section) in sections.into_iter().enumerate() {
            let points = weighted(section);
            let (knots, logical, clamped_start, clamped_end) = match i {
                0 => (KnotVector::LeftOpenRightClamped, points.len() - 2, false, true),
                i if i == last => (KnotVector::LeftClampedRightOpen, points.len() - 2, true, false),
                _ => (KnotVector::Clamped, points.len() - 1, true, true),
            };
            self.section(logical, clamped_start, clamped_end, |curve, base| {
                nurbs::extend_curve(curve, &points, knots, resolution, max_degree, base);
            });
        }
    }
}

/// `[last] + vertices + [first, second]` for closed NURBS. Only the
/// original interior vertices keep their strict flags.
fn wrap_padding(vertices: &[ControlVertex]) -> Vec<ControlVertex> {
    let loose = |v: &ControlVertex| ControlVertex { strict: false, ..*v };
    let n = vertices.len();
    let mut padded = Vec::with_capacity(n + 3);
    padded.push(loose(&vertices[n - 1]));
    padded.push(loose(&vertices[0]));
    padded.extend_from_slice(&vertices[1..]);
    padded.push(loose(&vertices[0]));
    padded.push(loose(&vertices[1 % n]));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{step_motion, SimulationParams, SimulationState};
    use approx::assert_relative_eq;

    const METHODS: [CurveMethod; 5] = [
        CurveMethod::Linear,
        CurveMethod::Bezier,
        CurveMethod::ClampedCubic,
        CurveMethod::BSpline,
        CurveMethod::Nurbs,
    ];

    fn vertices(coords: &[(f64, f64, f64)]) -> Vec<ControlVertex> {
        coords
            .iter()
            .map(|&(x, y, z)| Vector3::new(x, y, z).into())
            .collect()
    }

    fn hill() -> Vec<ControlVertex> {
        vertices(&[
            (0.0, 0.0, 0.0),
            (10.0, 6.0, 0.0),
            (20.0, 8.0, 4.0),
            (30.0, 2.0, 8.0),
            (40.0, 0.0, 8.0),
        ])
    }

    fn ring() -> Vec<ControlVertex> {
        vertices(&[
            (0.0, 0.0, 0.0),
            (20.0, 0.0, 0.0),
            (20.0, 0.0, 20.0),
            (0.0, 0.0, 20.0),
        ])
    }

    fn closed() -> CurveOptions {
        CurveOptions {
            closed: true,
            ..CurveOptions::default()
        }
    }

    #[test]
    fn test_bezier_scenario() {
        let points = vertices(&[(-3.0, -3.0, 0.0), (3.0, -3.0, 0.0), (-3.0, 3.0, 0.0), (3.0, 3.0, 0.0)]);
        let options = CurveOptions {
            resolution: 5.0,
            ..CurveOptions::default()
        };
        let curve = build_curve(&points, CurveMethod::Bezier, &options).unwrap();

        assert!(curve.len() >= 2);
        let estimate = bezier::estimate_length(&locations(&points));
        let error = (curve.total_arc_length() - estimate).abs() / estimate;
        assert!(error < 0.02, "length {} vs estimate {estimate}", curve.total_arc_length());

        let start = curve.transform_at_arc_length(0.0).position;
        assert_relative_eq!(start.x, -3.0, epsilon = 1e-12);
        assert_relative_eq!(start.y, -3.0, epsilon = 1e-12);
        assert_relative_eq!(start.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_every_method_is_monotonic() {
        for method in METHODS {
            let curve = build_curve(&hill(), method, &CurveOptions::default()).unwrap();
            assert!(curve.len() >= 2, "{method:?}");
            for pair in curve.nodes.windows(2) {
                let gap = pair[1].arc_length - pair[0].arc_length;
                assert!(gap > 0.0, "{method:?}");
                assert_relative_eq!(
                    gap,
                    pair[0].transform.position.distance(pair[1].transform.position),
                    epsilon = 1e-9
                );
                assert!(pair[1].segment_index >= pair[0].segment_index, "{method:?}");
            }
        }
    }

    #[test]
    fn test_interpolating_methods_hit_end_vertices() {
        for method in METHODS {
            let curve = build_curve(&hill(), method, &CurveOptions::default()).unwrap();
            let start = curve.position_at_arc_length(0.0);
            let end = curve.position_at_arc_length(curve.total_arc_length());
            assert!(start.distance(Vector3::ZERO) < 1e-9, "{method:?}");
            assert!(end.distance(Vector3::new(40.0, 0.0, 8.0)) < 1e-9, "{method:?}");
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        for method in METHODS {
            let a = build_curve(&hill(), method, &CurveOptions::default()).unwrap();
            let b = build_curve(&hill(), method, &CurveOptions::default()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_segment_offsets_count_vertices() {
        for method in METHODS {
            let open = build_curve(&hill(), method, &CurveOptions::default()).unwrap();
            assert_eq!(open.segment_offsets.len(), 5, "{method:?}");
            assert_eq!(open.segment_offsets[0], 0.0);
            assert_relative_eq!(open.segment_offsets[4], open.total_arc_length(), epsilon = 1e-9);
            assert!(open.segment_offsets.windows(2).all(|w| w[1] >= w[0]), "{method:?}");

            let looped = build_curve(&ring(), method, &closed()).unwrap();
            assert_eq!(looped.segment_offsets.len(), 5, "{method:?}");
        }
    }

    #[test]
    fn test_linear_offsets_land_on_vertices() {
        let curve = build_curve(&ring(), CurveMethod::Linear, &closed()).unwrap();
        assert_eq!(curve.segment_offsets, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_closed_loops_return_to_start() {
        for method in METHODS {
            let curve = build_curve(&ring(), method, &closed()).unwrap();
            let start = curve.nodes[0].transform.position;
            let end = curve.nodes[curve.len() - 1].transform.position;
            assert!(start.distance(end) < 1e-6, "{method:?}: {start:?} vs {end:?}");
        }
    }

    #[test]
    fn test_strict_vertex_splits_sections() {
        let mut points = hill();
        points[2].strict = true;
        let curve = build_curve(&points, CurveMethod::Nurbs, &CurveOptions::default()).unwrap();

        assert_eq!(curve.segment_offsets.len(), 5);
        let joint = curve.position_at_arc_length(curve.segment_offsets[2]);
        assert!(joint.distance(points[2].location()) < 1e-9, "{joint:?}");

        let smooth = build_curve(&hill(), CurveMethod::Nurbs, &CurveOptions::default()).unwrap();
        assert!(smooth.position_at_arc_length(smooth.segment_offsets[2]).distance(points[2].location()) > 0.1);
    }

    #[test]
    fn test_strict_closed_nurbs() {
        let mut points = ring();
        points[2].strict = true;
        let curve = build_curve(&points, CurveMethod::Nurbs, &closed()).unwrap();

        assert!(curve.len() > 2);
        let passes = curve
            .nodes
            .iter()
            .any(|node| node.transform.position.distance(points[2].location()) < 1e-9);
        assert!(passes);
    }

    #[test]
    fn test_weight_pulls_nurbs_toward_vertex() {
        let mut heavy = hill();
        heavy[2].position.w = 5.0;
        let plain = build_curve(&hill(), CurveMethod::Nurbs, &CurveOptions::default()).unwrap();
        let pulled = build_curve(&heavy, CurveMethod::Nurbs, &CurveOptions::default()).unwrap();

        let closest = |curve: &Curve| {
            curve
                .nodes
                .iter()
                .map(|node| node.transform.position.distance(heavy[2].location()))
                .fold(f64::INFINITY, f64::min)
        };
        assert!(closest(&pulled) < closest(&plain));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let options = CurveOptions::default();
        assert_eq!(
            build_curve(&[], CurveMethod::Nurbs, &options),
            Err(InvalidInput::NoControlPoints)
        );

        let coarse = CurveOptions {
            resolution: 0.0,
            ..options
        };
        assert_eq!(
            build_curve(&hill(), CurveMethod::Nurbs, &coarse),
            Err(InvalidInput::InvalidResolution(0.0))
        );

        let mut broken = hill();
        broken[3].position.y = f64::NAN;
        assert_eq!(
            build_curve(&broken, CurveMethod::Linear, &options),
            Err(InvalidInput::NonFiniteControlPoint { index: 3 })
        );

        let mut weightless = hill();
        weightless[1].position.w = 0.0;
        assert_eq!(
            build_curve(&weightless, CurveMethod::Nurbs, &options),
            Err(InvalidInput::InvalidWeight { index: 1, weight: 0.0 })
        );
    }

    #[test]
    fn test_single_vertex_is_stationary() {
        for method in METHODS {
            let curve = build_curve(&vertices(&[(1.0, 2.0, 3.0)]), method, &CurveOptions::default()).unwrap();
            assert_eq!(curve.len(), 1);
            assert_eq!(curve.total_arc_length(), 0.0);
            assert_eq!(curve.segment_offsets, vec![0.0]);
        }
    }

    #[test]
    fn test_duplicate_vertices_are_tolerated() {
        let points = vertices(&[(0.0, 0.0, 0.0), (0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        for method in METHODS {
            let curve = build_curve(&points, method, &CurveOptions::default()).unwrap();
            assert_relative_eq!(curve.total_arc_length(), 10.0, epsilon = 1e-6);
            assert_eq!(curve.segment_offsets.len(), 4, "{method:?}");
        }
    }

    #[test]
    fn test_flat_line_keeps_speed() {
        let line = vertices(&[(-10.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let curve = build_curve(&line, CurveMethod::Linear, &CurveOptions::default()).unwrap();
        let params = SimulationParams::new(9.81665, 0.0, 0.0);

        let state = step_motion(SimulationState::new(5.0, 0.0), &curve, &params, 1.0);
        assert_relative_eq!(state.distance_traveled, 5.0, max_relative = 0.01);
        assert_relative_eq!(state.velocity, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_looping_ride_on_closed_track() {
        let curve = build_curve(&ring(), CurveMethod::Nurbs, &closed()).unwrap();
        let total = curve.total_arc_length();
        let params = SimulationParams {
            reset_when_reached_limit: false,
            ..SimulationParams::new(0.0, 0.0, 0.0)
        };

        let state = step_motion(SimulationState::new(10.0, total - 1.0), &curve, &params, 0.5);
        assert_relative_eq!(state.distance_traveled, 4.0, epsilon = 1e-6);
        assert_relative_eq!(state.velocity, 10.0);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: CurveOptions = serde_json::from_str(r#"{ "closed": true }"#).unwrap();
        assert!(options.closed);
        assert_eq!(options.resolution, 20.0);
        assert_eq!(options.max_degree, 3);

        let method: CurveMethod = serde_json::from_str(r#""clamped_cubic""#).unwrap();
        assert_eq!(method, CurveMethod::ClampedCubic);
        let method: CurveMethod = serde_json::from_str(r#""bspline""#).unwrap();
        assert_eq!(method, CurveMethod::BSpline);

        let vertex: ControlVertex =
            serde_json::from_str(r#"{ "position": { "x": 1.0, "y": 2.0, "z": 3.0, "w": 2.0 }, "strict": true }"#)
                .unwrap();
        assert_eq!(vertex, ControlVertex::strict(Vector4::new(1.0, 2.0, 3.0, 2.0)));
    }
}
