//! Logical segment offsets.
//!
//! Externally authored data such as roll points address the track as
//! `segment + fraction`, counted between control vertices. Splines that
//! clamp their end tangents sample fewer knot intervals than there are
//! vertex-to-vertex segments, so interval boundaries read from the node
//! tags are expanded back to logical segments here.

use super::curve::CurveNode;
use super::search::find_bounding_indices;

/// Arc lengths where the node segment tags change, bracketed by the
/// first node's arc length and the total.
pub fn interval_offsets(nodes: &[CurveNode]) -> Vec<f64> {
    let Some(first) = nodes.first() else {
        return Vec::new();
    };

    let mut offsets = vec![first.arc_length];
    let mut tag = first.segment_index;
    for node in &nodes[1..] {
        if node.segment_index > tag {
            // A skipped tag is an interval that sampled to nothing.
            for _ in tag..node.segment_index {
                offsets.push(node.arc_length);
            }
            tag = node.segment_index;
        }
    }

    let total = nodes[nodes.len() - 1].arc_length;
    if offsets.len() == 1 || offsets[offsets.len() - 1] < total {
        offsets.push(total);
    }
    offsets
}

/// Expands knot-interval offsets to `logical_segments` segments.
///
/// A single interval is split evenly. Otherwise the surplus goes to the
/// clamped end intervals, half to each when both ends are clamped with
/// the start taking the odd piece.
pub fn split_intervals(
    offsets: &[f64],
    logical_segments: usize,
    clamped_start: bool,
    clamped_end: bool,
) -> Vec<f64> {
    let Some(&first) = offsets.first() else {
        return Vec::new();
    };
    let intervals = offsets.len() - 1;
    if intervals == 0 {
        return vec![first; logical_segments + 1];
    }
    if logical_segments <= intervals {
        return offsets.to_vec();
    }

    let extra = logical_segments - intervals;
    let mut pieces = vec![1usize; intervals];
    if intervals == 1 {
        pieces[0] = logical_segments;
    } else {
        match (clamped_start, clamped_end) {
            (true, true) => {
                pieces[0] += extra.div_ceil(2);
                pieces[intervals - 1] += extra / 2;
            }
            (true, false) => pieces[0] += extra,
            _ => pieces[intervals - 1] += extra,
        }
    }

    let mut out = Vec::with_capacity(logical_segments + 1);
    out.push(first);
    for (i, &count) in pieces.iter().enumerate() {
        let (from, to) = (offsets[i], offsets[i + 1]);
        for piece in 1..=count {
            out.push(from + (to - from) * piece as f64 / count as f64);
        }
    }
    out
}

/// Maps a logical position `segment + fraction` to an arc length,
/// clamping to the covered range. Empty offsets give 0.
pub fn arc_length_at_offset(position: f64, offsets: &[f64]) -> f64 {
    match offsets {
        [] => 0.0,
        [only] => *only,
        _ => {
            let last = offsets.len() - 1;
            let position = if position.is_nan() { 0.0 } else { position };
            let clamped = position.clamp(0.0, last as f64);
            let index = (clamped.floor() as usize).min(last - 1);
            let fraction = clamped - index as f64;
            offsets[index] + (offsets[index + 1] - offsets[index]) * fraction
        }
    }
}

/// Carries offsets over to a rebuilt curve given `(old_arc, new_arc)`
/// pairs sampled along it.
pub(crate) fn remap_offsets(offsets: &[f64], arcs: &[(f64, f64)]) -> Vec<f64> {
    offsets
        .iter()
        .map(|&offset| match find_bounding_indices(arcs, offset, |pair| pair.0) {
            None => arcs.first().map_or(offset, |pair| pair.1),
            Some((i, j)) => {
                let ((old_a, new_a), (old_b, new_b)) = (arcs[i], arcs[j]);
                let span = old_b - old_a;
                if span <= f64::EPSILON {
                    return new_a;
                }
                let t = ((offset - old_a) / span).clamp(0.0, 1.0);
                new_a + (new_b - new_a) * t
            }
        })
        .collect()
}
