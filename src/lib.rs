//! coaster-curve - parametric track curves and point-mass motion for
//! roller coaster simulation.
//!
//! # Architecture
//!
//! Layered modules with strict inward-only dependencies:
//!
//! - **sim**: Math primitives (Vector3, Frame, Transform) and motion physics
//! - **track**: Spline evaluators, arc-length indexed curves, roll curves
//! - **error**: Construction errors
//! - **ffi**: C FFI bindings
//!
//! # Usage
//!
//! ```ignore
//! use coaster_curve::{build_curve, CurveMethod, CurveOptions, MotionSimulation};
//! ```
//!
//! For C/C#/Unity, link the cdylib and use the `coaster_*` FFI functions.

pub mod error;
pub mod sim;
pub mod track;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types at crate root
pub use error::InvalidInput;
pub use sim::{
    step_motion, Frame, MotionSimulation, Quaternion, SimulationParams, SimulationState, Transform,
    Vector3, Vector4,
};
pub use track::{
    apply_roll, build_curve, build_roll_curve, ControlVertex, Curve, CurveMethod, CurveOptions,
    RollCurve, RollPoint,
};
