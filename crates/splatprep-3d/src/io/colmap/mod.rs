mod text;

pub use text::*;

use crate::camera::CameraModel;

/// Represents a Colmap camera model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraModelId {
    /// Invalid camera model
    CameraModelInvalid = -1,
    /// Simple pinhole camera model
    CameraModelSimplePinhole = 0,
    /// Pinhole camera model
    CameraModelPinhole = 1,
    /// Simplified radial camera model
    CameraModelSimplifiedRadial = 2,
    /// Radial camera model
    CameraModelRadial = 3,
    /// OpenCV camera model
    CameraModelOpenCV = 4,
    /// OpenCV fisheye camera model
    CameraModelOpenCVFisheye = 5,
    /// Full OpenCV camera model
    CameraModelFullOpenCV = 6,
    /// Field of view camera model
    CameraModelFOV = 7,
    /// Simple radial fisheye camera model
    CameraModelSimpleRadialFisheye = 8,
    /// Radial fisheye camera model
    CameraModelRadialFisheye = 9,
    /// Thin prism fisheye camera model
    CameraModelThinPrismFisheye = 10,
}

impl CameraModelId {
    /// The model name used in the text format.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModelId::CameraModelInvalid => "INVALID",
            CameraModelId::CameraModelSimplePinhole => "SIMPLE_PINHOLE",
            CameraModelId::CameraModelPinhole => "PINHOLE",
            CameraModelId::CameraModelSimplifiedRadial => "SIMPLE_RADIAL",
            CameraModelId::CameraModelRadial => "RADIAL",
            CameraModelId::CameraModelOpenCV => "OPENCV",
            CameraModelId::CameraModelOpenCVFisheye => "OPENCV_FISHEYE",
            CameraModelId::CameraModelFullOpenCV => "FULL_OPENCV",
            CameraModelId::CameraModelFOV => "FOV",
            CameraModelId::CameraModelSimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModelId::CameraModelRadialFisheye => "RADIAL_FISHEYE",
            CameraModelId::CameraModelThinPrismFisheye => "THIN_PRISM_FISHEYE",
        }
    }

    /// Expected number of parameters, `None` for the invalid model.
    pub fn num_params(&self) -> Option<usize> {
        match self {
            CameraModelId::CameraModelInvalid => None,
            CameraModelId::CameraModelSimplePinhole => Some(3),
            CameraModelId::CameraModelPinhole => Some(4),
            CameraModelId::CameraModelSimplifiedRadial => Some(4),
            CameraModelId::CameraModelRadial => Some(5),
            CameraModelId::CameraModelOpenCV => Some(8),
            CameraModelId::CameraModelOpenCVFisheye => Some(8),
            CameraModelId::CameraModelFullOpenCV => Some(12),
            CameraModelId::CameraModelFOV => Some(5),
            CameraModelId::CameraModelSimpleRadialFisheye => Some(4),
            CameraModelId::CameraModelRadialFisheye => Some(5),
            CameraModelId::CameraModelThinPrismFisheye => Some(12),
        }
    }
}

impl From<CameraModel> for CameraModelId {
    fn from(model: CameraModel) -> Self {
        match model {
            CameraModel::Pinhole => CameraModelId::CameraModelPinhole,
            CameraModel::OpenCv => CameraModelId::CameraModelOpenCV,
        }
    }
}

/// Represents a camera in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapCamera {
    /// Camera id
    pub camera_id: u32,
    /// Camera model id
    pub model_id: CameraModelId,
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Camera parameters
    pub params: Vec<f64>,
}

/// Represents an image in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapImage {
    /// Image name
    pub name: String,
    /// Image id
    pub image_id: u32,
    /// Camera id
    pub camera_id: u32,
    /// Rotation
    pub rotation: [f64; 4], // qw, qx, qy, qz
    /// Translation
    pub translation: [f64; 3], // x, y, z
    /// Points2d
    pub points2d: Vec<(f64, f64, i64)>,
}

/// Represents a 3D point in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapPoint3d {
    /// Point3d id
    pub point3d_id: u64,
    /// x, y, z coordinates
    pub xyz: [f64; 3],
    /// rgb color
    pub rgb: [u8; 3],
    /// Error
    pub error: f64,
    /// Track
    pub track: Vec<(u32, u32)>,
}
