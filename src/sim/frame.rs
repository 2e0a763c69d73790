use super::math::{Quaternion, Vector3};

/// Orthonormal coordinate frame for track orientation.
///
/// The axes are the rotation columns of the node's 4x4 matrix:
/// - `left`: x column, pointing to the left of the direction of travel
/// - `up`: y column, away from the rails toward the riders
/// - `front`: z column, the tangent in the direction of travel
///
/// `left x up = front`. The identity frame is axis aligned.
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub left: Vector3,
    pub up: Vector3,
    pub front: Vector3,
}

impl Frame {
    pub const fn new(left: Vector3, up: Vector3, front: Vector3) -> Self {
        Self { left, up, front }
    }

    pub const IDENTITY: Self = Self::new(Vector3::X, Vector3::UP, Vector3::Z);

    pub fn from_quaternion(q: Quaternion) -> Self {
        Self::new(
            q.mul_vec(Vector3::X),
            q.mul_vec(Vector3::UP),
            q.mul_vec(Vector3::Z),
        )
    }

    pub fn to_quaternion(self) -> Quaternion {
        Quaternion::from_basis(self.left, self.up, self.front)
    }

    /// Re-orthonormalizes the frame using the Gram-Schmidt process.
    ///
    /// Preserves front exactly, orthogonalizes up against it, then
    /// recomputes left as up x front.
    pub fn reorthonormalize(self) -> Self {
        let front = self.front.normalize();
        let up = (self.up - front * front.dot(self.up)).normalize();
        let left = up.cross(front).normalize();
        Self::new(left, up, front)
    }

    /// Rotates the frame around an arbitrary world axis.
    ///
    /// # Arguments
    /// * `axis` - Rotation axis (will be normalized)
    /// * `angle` - Rotation angle in radians
    pub fn rotate_around(self, axis: Vector3, angle: f64) -> Self {
        let q = Quaternion::from_axis_angle(axis, angle);
        Self {
            left: q.mul_vec(self.left).normalize(),
            up: q.mul_vec(self.up).normalize(),
            front: q.mul_vec(self.front).normalize(),
        }
    }

    /// Rotates the frame about its own front axis; a positive angle turns
    /// left toward up.
    pub fn rolled(self, angle: f64) -> Self {
        self.rotate_around(self.front, angle)
    }

    /// Expresses a world direction in this frame's local coordinates.
    pub fn to_local(self, direction: Vector3) -> Vector3 {
        Vector3::new(
            direction.dot(self.left),
            direction.dot(self.up),
            direction.dot(self.front),
        )
    }

    pub fn to_world(self, local: Vector3) -> Vector3 {
        self.left * local.x + self.up * local.y + self.front * local.z
    }

    /// Turns the frame minimally so its front axis points along `direction`.
    ///
    /// The direction is decomposed into the frame's local space, then the
    /// frame yaws about its own up axis and pitches about the yawed left
    /// axis. Working relative to the previous orientation avoids the up
    /// vector flips a global look-at produces near vertical tangents.
    pub fn look_relative_at(self, direction: Vector3) -> Self {
        let local = self.to_local(direction.normalize());
        let horizontal = (local.x * local.x + local.z * local.z).sqrt();

        let yaw = if horizontal < 1e-12 {
            0.0
        } else {
            local.x.atan2(local.z)
        };
        let pitch = (-local.y).atan2(horizontal);

        let yawed = self.rotate_around(self.up, yaw);
        yawed.rotate_around(yawed.left, pitch)
    }

    /// Bank angle of the frame measured against the world y axis, or
    /// against the world z axis for vertical track.
    pub fn roll_angle(self, vertical: bool) -> f64 {
        if vertical {
            self.left.z.atan2(self.up.z)
        } else {
            self.left.y.atan2(self.up.y)
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}
