//! Curve construction and arc-length indexing.
//!
//! Spline evaluators turn control points into positions, [`Curve`] turns
//! positions into an arc-length indexed sequence of frames, and the roll
//! module banks the finished curve.

pub mod bezier;
pub mod bspline;
mod build;
pub mod cubic;
mod curve;
pub mod nurbs;
mod roll;
pub mod search;
mod segments;

pub use build::{build_curve, ControlVertex, CurveMethod, CurveOptions};
pub use curve::{Curve, CurveNode, POSITION_EPSILON};
pub use roll::{apply_roll, build_roll_curve, RollCurve, RollPoint, RollSample};
pub use segments::{arc_length_at_offset, interval_offsets, split_intervals};
