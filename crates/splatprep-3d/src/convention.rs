//! The authoring convention is a Z-up world with cameras looking down their local -Z
//! axis. COLMAP stores world-to-camera poses as a Hamilton quaternion `(w, x, y, z)`
//! and a translation in a Y-up world.
//!
//! The rotation remap below reproduces the tuple emitted by existing exports
//! byte for byte: the first slot holds the original `x` component, not a re-derived
//! scalar. The translation is derived from that same remapped rotation, so the
//! emitted row is self consistent: `-R^T t` gives back the camera position.

use glam::{DMat3, DQuat, DVec3};

use crate::{camera::VirtualCamera, rotation::Rotation};

/// A world-to-camera pose in COLMAP convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColmapPose {
    /// Rotation as written in images.txt, QW QX QY QZ.
    pub qvec: [f64; 4],
    /// Translation as written in images.txt, TX TY TZ.
    pub tvec: [f64; 3],
}

impl ColmapPose {
    /// The rotation matrix of the quaternion in `qvec`.
    pub fn rotation_matrix(&self) -> DMat3 {
        qvec_to_matrix(&self.qvec)
    }

    /// The camera center recovered from the world-to-camera pose, `-R^T t`.
    pub fn camera_center(&self) -> DVec3 {
        -(self.rotation_matrix().transpose() * DVec3::from_array(self.tvec))
    }
}

/// Remap a rotation to the COLMAP quaternion slots.
///
/// Returns `(x, w, z, -y)` of the input quaternion, to be written as QW QX QY QZ.
pub fn convert_rotation(rotation: &Rotation) -> [f64; 4] {
    let q = rotation.quaternion();
    [q.x, q.w, q.z, -q.y]
}

/// World-to-camera translation `-(R * position)` where `R` is the rotation of the
/// remapped quaternion `qvec`.
pub fn convert_translation(position: DVec3, qvec: &[f64; 4]) -> [f64; 3] {
    (-(qvec_to_matrix(qvec) * position)).to_array()
}

/// Convert a camera world pose to its COLMAP row values.
pub fn to_colmap_pose(camera: &VirtualCamera) -> ColmapPose {
    let qvec = convert_rotation(&camera.rotation);
    let tvec = convert_translation(camera.position, &qvec);
    ColmapPose { qvec, tvec }
}

// qvec is (w, x, y, z) and is a unit quaternion by construction
fn qvec_to_matrix(qvec: &[f64; 4]) -> DMat3 {
    DMat3::from_quat(DQuat::from_xyzw(qvec[1], qvec[2], qvec[3], qvec[0]))
}
