use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Error types for the rotation module.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// The quaternion has zero or non-finite norm.
    #[error("Cannot build a rotation from a quaternion with norm {0}")]
    InvalidNorm(f64),
}

/// A 3D rotation stored as a unit quaternion.
///
/// This is the single rotation representation used by the crate. Euler angles are
/// only accepted at the boundary through [`Rotation::from_euler_xyz`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation(DQuat);

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Self = Self(DQuat::IDENTITY);

    /// Create a rotation from a quaternion in `(w, x, y, z)` order.
    ///
    /// The quaternion is normalized.
    pub fn from_wxyz(wxyz: [f64; 4]) -> Result<Self, RotationError> {
        let q = DQuat::from_xyzw(wxyz[1], wxyz[2], wxyz[3], wxyz[0]);
        let norm = q.length();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(RotationError::InvalidNorm(norm));
        }
        Ok(Self(q / norm))
    }

    /// Create a rotation from XYZ Euler angles in radians.
    ///
    /// The rotation applies X first, then Y, then Z about the fixed world axes.
    pub fn from_euler_xyz(angles: [f64; 3]) -> Self {
        Self(DQuat::from_euler(EulerRot::ZYX, angles[2], angles[1], angles[0]))
    }

    /// Rotation whose local +Z axis points along `direction` and whose local +Y axis
    /// leans towards the world +Z axis.
    ///
    /// When `direction` is parallel to the world Z axis the world +Y axis is used as
    /// the up reference instead. Returns `None` for a zero direction.
    pub fn track_to(direction: DVec3) -> Option<Self> {
        let z_axis = direction.try_normalize()?;

        let up = if z_axis.cross(DVec3::Z).length_squared() < 1e-12 {
            DVec3::Y
        } else {
            DVec3::Z
        };

        let y_axis = (up - z_axis * up.dot(z_axis)).normalize();
        let x_axis = y_axis.cross(z_axis);

        let q = DQuat::from_mat3(&DMat3::from_cols(x_axis, y_axis, z_axis));
        Some(Self(q.normalize()))
    }

    /// Rotate about this rotation's own X axis by `angle` radians.
    pub fn rotate_local_x(self, angle: f64) -> Self {
        Self((self.0 * DQuat::from_rotation_x(angle)).normalize())
    }

    /// Return the same rotation with a non-negative scalar term.
    pub fn canonical(self) -> Self {
        if self.0.w < 0.0 {
            Self(-self.0)
        } else {
            self
        }
    }

    /// The rotation as a glam quaternion.
    #[inline]
    pub fn quaternion(&self) -> DQuat {
        self.0
    }

    /// The quaternion components in `(w, x, y, z)` order.
    pub fn to_wxyz(&self) -> [f64; 4] {
        [self.0.w, self.0.x, self.0.y, self.0.z]
    }

    /// The rotation as a 3x3 matrix.
    pub fn to_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.0)
    }

    /// Rotate a vector.
    #[inline]
    pub fn rotate(&self, v: DVec3) -> DVec3 {
        self.0 * v
    }

    /// The inverse rotation.
    pub fn inverse(&self) -> Self {
        Self(self.0.conjugate())
    }
}
