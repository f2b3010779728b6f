use glam::{DAffine3, DVec3};
use serde::{Deserialize, Serialize};

use crate::rotation::Rotation;

/// World transform of an object: scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position of the object origin in world space.
    pub translation: DVec3,
    /// Orientation of the object.
    pub rotation: Rotation,
    /// Per-axis scale factors.
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Serialized form of a [`Transform`] with the rotation given as XYZ Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    /// Position of the object origin in world space.
    pub location: [f64; 3],
    /// XYZ Euler angles in degrees.
    pub rotation_euler_deg: [f64; 3],
    /// Per-axis scale factors.
    pub scale: [f64; 3],
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation_euler_deg: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl From<TransformDesc> for Transform {
    fn from(desc: TransformDesc) -> Self {
        Transform {
            translation: DVec3::from_array(desc.location),
            rotation: Rotation::from_euler_xyz(desc.rotation_euler_deg.map(f64::to_radians)),
            scale: DVec3::from_array(desc.scale),
        }
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: Rotation::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Create a transform from its components.
    pub fn new(translation: DVec3, rotation: Rotation, scale: DVec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Create a pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// The transform as an affine matrix.
    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_scale_rotation_translation(
            self.scale,
            self.rotation.quaternion(),
            self.translation,
        )
    }

    /// Transform a single point from object space to world space.
    #[inline]
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        self.to_affine()
            .transform_point3(DVec3::from_array(*point))
            .to_array()
    }

    /// Transform a set of points from object space to world space.
    ///
    /// # Arguments
    ///
    /// * `src_points` - The points in object space.
    ///
    /// # Returns
    ///
    /// The points in world space, in the same order.
    ///
    /// Example:
    ///
    /// ```no_run
    /// use glam::DVec3;
    /// use splatprep_3d::transforms::Transform;
    ///
    /// let transform = Transform::from_translation(DVec3::new(1.0, 0.0, 0.0));
    /// let points = transform.transform_points(&[[0.0, 0.0, 0.0]]);
    /// assert_eq!(points, vec![[1.0, 0.0, 0.0]]);
    /// ```
    pub fn transform_points(&self, src_points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let affine = self.to_affine();
        src_points
            .iter()
            .map(|p| affine.transform_point3(DVec3::from_array(*p)).to_array())
            .collect()
    }
}
