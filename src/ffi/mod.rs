//! Single-call FFI for coaster-curve.
//!
//! Functions:
//! - `coaster_build_curve` - control vertices in, sampled curve out
//! - `coaster_transform_at` - transform at an arc length of a sampled curve
//! - `coaster_step_motion` - one simulation tick along a sampled curve
//!
//! Curves cross the boundary as arrays of [`CurveSample`]; the host owns
//! every buffer.
//!
//! # Error Codes
//! - `0`: Success
//! - `-1`: Null pointer
//! - `-2`: Invalid input
//! - `-3`: Buffer overflow (resize and retry)

use crate::sim::{step_motion, AccelerationSection, SimulationParams, SimulationState, Transform, Vector4};
use crate::track::{build_curve, ControlVertex, Curve, CurveMethod, CurveNode, CurveOptions};

/// Control vertex with its NURBS weight.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FfiVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub strict: u8,
}

/// One curve node as a column-major 4x4 matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurveSample {
    pub arc_length: f64,
    pub segment_index: u32,
    pub matrix: [f64; 16],
}

/// Output buffers for a built curve.
#[repr(C)]
pub struct CurveOutput {
    pub samples: *mut CurveSample,
    pub samples_capacity: usize,
    pub segment_offsets: *mut f64,
    pub offsets_capacity: usize,

    // Output counts (written by coaster_build_curve, also on overflow)
    pub samples_count: *mut usize,
    pub offsets_count: *mut usize,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FfiSimulationParams {
    pub gravity: f64,
    pub friction: f64,
    pub air_resistance: f64,
    pub max_delta_time: f64,
    pub reset_when_reached_limit: u8,
    pub initial_velocity: f64,
    pub initial_distance: f64,
}

/// Acceleration zone; a NaN velocity bound means unbounded.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FfiSection {
    pub from_arc_length: f64,
    pub to_arc_length: f64,
    pub acceleration: f64,
    pub max_velocity: f64,
    pub min_velocity: f64,
}

/// Build a curve from control vertices.
///
/// `method`: 0 linear, 1 bezier, 2 clamped cubic, 3 B-spline, 4 NURBS.
///
/// # Safety
///
/// - `vertices` must be valid for `vertex_count` reads
/// - `output` must point to a `CurveOutput` whose buffers hold at least
///   their `*_capacity` elements and whose count pointers are valid
#[no_mangle]
pub unsafe extern "C" fn coaster_build_curve(
    vertices: *const FfiVertex,
    vertex_count: usize,
    method: u32,
    resolution: f64,
    closed: u8,
    output: *mut CurveOutput,
) -> i32 {
    if output.is_null() || (vertex_count > 0 && vertices.is_null()) {
        return -1;
    }
    let output = &mut *output;
    if output.samples_count.is_null() || output.offsets_count.is_null() {
        return -1;
    }

    let Some(method) = to_method(method) else {
        return -2;
    };
    let vertices: Vec<ControlVertex> = to_slice(vertices, vertex_count)
        .iter()
        .map(|v| ControlVertex {
            position: Vector4::new(v.x, v.y, v.z, v.w),
            strict: v.strict != 0,
        })
        .collect();
    let options = CurveOptions {
        resolution,
        closed: closed != 0,
        ..CurveOptions::default()
    };

    let curve = match build_curve(&vertices, method, &options) {
        Ok(curve) => curve,
        Err(_) => return -2,
    };

    *output.samples_count = curve.nodes.len();
    *output.offsets_count = curve.segment_offsets.len();
    if curve.nodes.len() > output.samples_capacity
        || curve.segment_offsets.len() > output.offsets_capacity
    {
        return -3;
    }
    if output.samples.is_null() || output.segment_offsets.is_null() {
        return -1;
    }

    for (i, node) in curve.nodes.iter().enumerate() {
        *output.samples.add(i) = CurveSample {
            arc_length: node.arc_length,
            segment_index: node.segment_index,
            matrix: node.transform.to_matrix(),
        };
    }
    for (i, &offset) in curve.segment_offsets.iter().enumerate() {
        *output.segment_offsets.add(i) = offset;
    }

    0
}

/// Transform at `arc_length` along a sampled curve, written as a
/// column-major matrix.
///
/// # Safety
///
/// - `samples` must be valid for `sample_count` reads
/// - `matrix` must be valid for one `[f64; 16]` write
#[no_mangle]
pub unsafe extern "C" fn coaster_transform_at(
    samples: *const CurveSample,
    sample_count: usize,
    arc_length: f64,
    matrix: *mut [f64; 16],
) -> i32 {
    if matrix.is_null() || (sample_count > 0 && samples.is_null()) {
        return -1;
    }
    let curve = to_curve(to_slice(samples, sample_count));
    *matrix = curve.transform_at_arc_length(arc_length).to_matrix();
    0
}

/// Advance `state` by `delta_time` along a sampled curve.
///
/// # Safety
///
/// - `samples` must be valid for `sample_count` reads
/// - `sections` must be valid for `section_count` reads (may be null if 0)
/// - `params` and `state` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn coaster_step_motion(
    samples: *const CurveSample,
    sample_count: usize,
    params: *const FfiSimulationParams,
    sections: *const FfiSection,
    section_count: usize,
    state: *mut SimulationState,
    delta_time: f64,
) -> i32 {
    if params.is_null()
        || state.is_null()
        || (sample_count > 0 && samples.is_null())
        || (section_count > 0 && sections.is_null())
    {
        return -1;
    }

    let params = to_params(&*params, to_slice(sections, section_count));
    if params.validate().is_err() {
        return -2;
    }
    let curve = to_curve(to_slice(samples, sample_count));
    *state = step_motion(*state, &curve, &params, delta_time);
    0
}

// --- Helpers ---

unsafe fn to_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 || ptr.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

fn to_method(method: u32) -> Option<CurveMethod> {
    match method {
        0 => Some(CurveMethod::Linear),
        1 => Some(CurveMethod::Bezier),
        2 => Some(CurveMethod::ClampedCubic),
        3 => Some(CurveMethod::BSpline),
        4 => Some(CurveMethod::Nurbs),
        _ => None,
    }
}

fn to_curve(samples: &[CurveSample]) -> Curve {
    Curve {
        nodes: samples
            .iter()
            .map(|s| CurveNode {
                transform: Transform::from_matrix(&s.matrix),
                arc_length: s.arc_length,
                segment_index: s.segment_index,
            })
            .collect(),
        segment_offsets: Vec::new(),
    }
}

fn to_params(params: &FfiSimulationParams, sections: &[FfiSection]) -> SimulationParams {
    let bound = |v: f64| if v.is_nan() { None } else { Some(v) };
    SimulationParams {
        gravity: params.gravity,
        friction: params.friction,
        air_resistance: params.air_resistance,
        max_delta_time: params.max_delta_time,
        reset_when_reached_limit: params.reset_when_reached_limit != 0,
        initial_velocity: params.initial_velocity,
        initial_distance: params.initial_distance,
        sections: sections
            .iter()
            .map(|s| AccelerationSection {
                from_arc_length: s.from_arc_length,
                to_arc_length: s.to_arc_length,
                acceleration: s.acceleration,
                max_velocity: bound(s.max_velocity),
                min_velocity: bound(s.min_velocity),
            })
            .collect(),
    }
}
