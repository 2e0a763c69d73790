use log::trace;

use crate::sim::{Frame, TrackPath, Transform, Vector3};

use super::roll::RollCurve;
use super::search::{find_bounding_indices, uniform_sample};
use super::segments::{interval_offsets, remap_offsets, split_intervals};

/// Inserts closer than this to the previous node are dropped.
pub const POSITION_EPSILON: f64 = 1e-9;

/// One sample of a curve.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurveNode {
    pub transform: Transform,
    /// Cumulative distance from the first node.
    pub arc_length: f64,
    /// Source segment the node was sampled from. The node ending segment
    /// `k` carries `k + 1`.
    pub segment_index: u32,
}

/// Arc-length indexed sequence of rigid transforms.
///
/// `segment_offsets` holds the arc length at which each logical
/// vertex-to-vertex segment starts, followed by the total length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub nodes: Vec<CurveNode>,
    pub segment_offsets: Vec<f64>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_arc_length(&self) -> f64 {
        self.nodes.last().map_or(0.0, |node| node.arc_length)
    }

    /// Appends a node at `position`, turning the previous node to face it.
    ///
    /// The new node copies the re-aimed frame so orientation propagates
    /// along the curve. Returns `false` if the insert was a duplicate.
    pub fn insert_position(&mut self, position: Vector3, segment_index: u32) -> bool {
        let Some(last) = self.nodes.last_mut() else {
            self.nodes.push(CurveNode {
                transform: Transform::new(position, Frame::IDENTITY),
                arc_length: 0.0,
                segment_index,
            });
            return true;
        };

        let delta = position - last.transform.position;
        let step = delta.length();
        if step <= POSITION_EPSILON {
            trace!("dropping duplicate curve position {position:?}");
            return false;
        }

        last.transform.frame = last.transform.frame.look_relative_at(delta);
        let node = CurveNode {
            transform: last.transform.with_position(position),
            arc_length: last.arc_length + step,
            segment_index,
        };
        self.nodes.push(node);
        true
    }

    /// Appends a fully known transform; only arc length is derived.
    pub fn insert_transform(&mut self, transform: Transform, segment_index: u32) -> bool {
        let arc_length = match self.nodes.last() {
            None => 0.0,
            Some(last) => {
                let step = last.transform.distance(&transform);
                if step <= POSITION_EPSILON {
                    trace!("dropping duplicate curve transform at {:?}", transform.position);
                    return false;
                }
                last.arc_length + step
            }
        };
        self.nodes.push(CurveNode {
            transform,
            arc_length,
            segment_index,
        });
        true
    }

    /// Bounding nodes of `at` and the clamped blend factor between them.
    fn bracket(&self, at: f64) -> Option<(&CurveNode, &CurveNode, Option<f64>)> {
        let at = if at.is_nan() { 0.0 } else { at };
        let (i, j) = find_bounding_indices(&self.nodes, at, |node| node.arc_length)?;
        let (left, right) = (&self.nodes[i], &self.nodes[j]);
        let length = right.arc_length - left.arc_length;
        if length <= f64::EPSILON {
            return Some((left, right, None));
        }
        let t = ((at - left.arc_length) / length).clamp(0.0, 1.0);
        Some((left, right, Some(t)))
    }

    /// Interpolated transform at `at`; queries outside the curve freeze at
    /// the end transforms. Empty and single-node curves give the identity.
    pub fn transform_at_arc_length(&self, at: f64) -> Transform {
        match self.bracket(at) {
            None => Transform::IDENTITY,
            Some((left, _, None)) => left.transform,
            Some((left, right, Some(t))) => Transform::interpolate(&left.transform, &right.transform, t),
        }
    }

    /// Interpolated position with the orientation of the preceding node.
    pub fn transform_at_arc_length_without_transition(&self, at: f64) -> Transform {
        match self.bracket(at) {
            None => Transform::IDENTITY,
            Some((left, _, None)) => left.transform,
            Some((left, right, Some(t))) => left
                .transform
                .with_position(left.transform.position.lerp(right.transform.position, t)),
        }
    }

    pub fn position_at_arc_length(&self, at: f64) -> Vector3 {
        self.transform_at_arc_length(at).position
    }

    pub fn front_direction_at_arc_length(&self, at: f64) -> Vector3 {
        self.transform_at_arc_length(at).front_direction()
    }

    /// Polyline through `points`, one segment per consecutive pair.
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut curve = Self::new();
        for (i, &point) in points.iter().enumerate() {
            curve.insert_position(point, i as u32);
        }
        curve.segment_offsets = interval_offsets(&curve.nodes);
        curve
    }

    /// Samples `f(at, t)` evenly over `[from, to]` at `resolution`
    /// samples per unit.
    pub fn from_uniform_sample<F>(from: f64, to: f64, resolution: f64, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> Vector3,
    {
        let mut curve = Self::new();
        curve.extend_uniform_sample(from, to, resolution, |at, t| (f(at, t), 0));
        curve.segment_offsets = interval_offsets(&curve.nodes);
        curve
    }

    /// Appends uniformly sampled positions with their segment tags.
    pub fn extend_uniform_sample<F>(&mut self, from: f64, to: f64, resolution: f64, mut f: F)
    where
        F: FnMut(f64, f64) -> (Vector3, u32),
    {
        uniform_sample(from, to, resolution, |at, t| {
            let (position, segment_index) = f(at, t);
            self.insert_position(position, segment_index);
        });
    }

    /// Copy with nodes evenly spaced `spacing` apart along the curve.
    pub fn resample(&self, spacing: f64) -> Self {
        if self.nodes.len() < 2 || !(spacing > 0.0 && spacing.is_finite()) {
            return self.clone();
        }

        let total = self.total_arc_length();
        let count = 2.max((total / spacing).ceil() as usize + 1);

        let mut out = Self::new();
        let mut arcs = Vec::with_capacity(count);
        for i in 0..count {
            let at = total * i as f64 / (count - 1) as f64;
            let segment_index = match self.bracket(at) {
                Some((_, right, Some(t))) if t >= 1.0 => right.segment_index,
                Some((left, _, _)) => left.segment_index,
                None => 0,
            };
            if out.insert_transform(self.transform_at_arc_length(at), segment_index) {
                arcs.push((at, out.total_arc_length()));
            }
        }
        out.segment_offsets = remap_offsets(&self.segment_offsets, &arcs);
        out
    }

    /// Copy with every node moved by `offset` in its own frame, e.g. from
    /// the heart line down to the rails.
    pub fn offset_local(&self, offset: Vector3) -> Self {
        let mut out = Self::new();
        let mut arcs = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let position = node.transform.position + node.transform.frame.to_world(offset);
            if out.insert_transform(node.transform.with_position(position), node.segment_index) {
                arcs.push((node.arc_length, out.total_arc_length()));
            }
        }
        out.segment_offsets = remap_offsets(&self.segment_offsets, &arcs);
        out
    }

    /// Logical segment offsets for a curve sampled from `vertex_count`
    /// clamped control vertices in one piece.
    pub fn to_segment_offsets(&self, vertex_count: usize) -> Vec<f64> {
        let offsets = interval_offsets(&self.nodes);
        split_intervals(&offsets, vertex_count.saturating_sub(1), true, true)
    }

    /// Banks every node about its own front axis by the negated roll at
    /// its arc length. Run after the geometry is final.
    pub fn apply_roll(&mut self, roll: &RollCurve) {
        for node in &mut self.nodes {
            let angle = roll.angle_at(node.arc_length);
            node.transform.frame = node.transform.frame.rolled(-angle);
        }
    }
}

impl TrackPath for Curve {
    fn total_arc_length(&self) -> f64 {
        Curve::total_arc_length(self)
    }

    fn transform_at(&self, arc_length: f64) -> Transform {
        self.transform_at_arc_length(arc_length)
    }
}
