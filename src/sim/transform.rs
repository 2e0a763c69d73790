use super::frame::Frame;
use super::math::{Quaternion, Vector3};

/// Rigid transformation with optional scale: a position plus an
/// orthonormal orientation frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    pub frame: Frame,
    pub scale: Vector3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vector3::ZERO,
        frame: Frame::IDENTITY,
        scale: Vector3::ONE,
    };

    pub const fn new(position: Vector3, frame: Frame) -> Self {
        Self {
            position,
            frame,
            scale: Vector3::ONE,
        }
    }

    pub fn compose(position: Vector3, rotation: Quaternion, scale: Vector3) -> Self {
        Self {
            position,
            frame: Frame::from_quaternion(rotation.normalize()),
            scale,
        }
    }

    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        (self.position, self.frame.to_quaternion(), self.scale)
    }

    /// Builds a transform from explicit basis columns, as supplied by
    /// imported track data. Column lengths become the scale.
    pub fn from_basis(left: Vector3, up: Vector3, front: Vector3, position: Vector3) -> Self {
        let scale = Vector3::new(left.length(), up.length(), front.length());
        let frame = Frame::new(left.normalize(), up.normalize(), front.normalize()).reorthonormalize();
        Self {
            position,
            frame,
            scale,
        }
    }

    /// Column-major 4x4 matrix: columns are left, up, front and position.
    pub fn to_matrix(&self) -> [f64; 16] {
        let l = self.frame.left * self.scale.x;
        let u = self.frame.up * self.scale.y;
        let f = self.frame.front * self.scale.z;
        let p = self.position;
        [
            l.x, l.y, l.z, 0.0, //
            u.x, u.y, u.z, 0.0, //
            f.x, f.y, f.z, 0.0, //
            p.x, p.y, p.z, 1.0,
        ]
    }

    /// Inverse of [`Transform::to_matrix`] for matrices without shear.
    pub fn from_matrix(m: &[f64; 16]) -> Self {
        Self::from_basis(
            Vector3::new(m[0], m[1], m[2]),
            Vector3::new(m[4], m[5], m[6]),
            Vector3::new(m[8], m[9], m[10]),
            Vector3::new(m[12], m[13], m[14]),
        )
    }

    /// Lerps position and scale, slerps rotation.
    pub fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        let rotation = a.frame.to_quaternion().slerp(b.frame.to_quaternion(), t);
        Self::compose(
            a.position.lerp(b.position, t),
            rotation,
            a.scale.lerp(b.scale, t),
        )
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.position.distance(other.position)
    }

    pub fn transform_point(&self, local: Vector3) -> Vector3 {
        let scaled = Vector3::new(
            local.x * self.scale.x,
            local.y * self.scale.y,
            local.z * self.scale.z,
        );
        self.position + self.frame.to_world(scaled)
    }

    pub fn left_direction(&self) -> Vector3 {
        self.frame.left
    }

    pub fn up_direction(&self) -> Vector3 {
        self.frame.up
    }

    pub fn front_direction(&self) -> Vector3 {
        self.frame.front
    }

    pub fn with_position(self, position: Vector3) -> Self {
        Self { position, ..self }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
