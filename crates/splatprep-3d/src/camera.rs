use std::{fmt, str::FromStr};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::rotation::Rotation;

/// Default sensor width in millimeters, a full frame sensor.
pub const DEFAULT_SENSOR_WIDTH_MM: f64 = 36.0;

/// Render resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Resolution {
    /// Create a new resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Whether both dimensions are non zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Physical lens of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Focal length in millimeters.
    pub focal_length_mm: f64,
    /// Sensor width in millimeters.
    pub sensor_width_mm: f64,
    /// Sensor height in millimeters.
    pub sensor_height_mm: f64,
}

impl Lens {
    /// Lens whose sensor width spans `fov` radians, with the sensor height following the
    /// render aspect ratio.
    pub fn from_fov(fov: f64, sensor_width_mm: f64, aspect_ratio: f64) -> Self {
        Self {
            focal_length_mm: sensor_width_mm / (2.0 * (fov / 2.0).tan()),
            sensor_width_mm,
            sensor_height_mm: sensor_width_mm / aspect_ratio,
        }
    }
}

/// An ephemeral camera created for an export.
///
/// The orientation follows the authoring convention: the camera looks down its local -Z
/// axis with local +Y as up, in a Z-up world.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCamera {
    /// Camera name in the scene.
    pub name: String,
    /// Position in world space.
    pub position: DVec3,
    /// Orientation in world space.
    pub rotation: Rotation,
    /// Field of view in radians spanned by the sensor width.
    pub fov: f64,
    /// Physical lens parameters.
    pub lens: Lens,
    /// Render resolution.
    pub resolution: Resolution,
}

impl VirtualCamera {
    /// The world-space viewing direction.
    pub fn forward(&self) -> DVec3 {
        self.rotation.rotate(DVec3::NEG_Z)
    }

    /// Intrinsics at the camera's own render resolution.
    pub fn intrinsics(&self) -> PinholeCameraIntrinsic {
        intrinsics(self, self.resolution.width, self.resolution.height)
    }
}

/// A struct representing the intrinsic parameters of a pinhole camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PinholeCameraIntrinsic {
    /// The focal length in pixels (fx, fy)
    pub focal_length: (f64, f64),
    /// The principal point in pixels (cx, cy)
    pub principal_point: (f64, f64),
    /// The image dimensions (width, height)
    pub image_size: (u32, u32),
}

impl PinholeCameraIntrinsic {
    /// Creates a new PinholeCameraIntrinsic with the given parameters.
    pub fn new(
        focal_length: (f64, f64),
        principal_point: (f64, f64),
        image_size: (u32, u32),
    ) -> Self {
        Self {
            focal_length,
            principal_point,
            image_size,
        }
    }

    /// Parameters in the order the given COLMAP model expects.
    ///
    /// No lens distortion is modeled, the OPENCV coefficients are exact zeros.
    pub fn params(&self, model: CameraModel) -> Vec<f64> {
        let (fx, fy) = self.focal_length;
        let (cx, cy) = self.principal_point;
        match model {
            CameraModel::Pinhole => vec![fx, fy, cx, cy],
            CameraModel::OpenCv => vec![fx, fy, cx, cy, 0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Derive pinhole intrinsics from a camera lens and a render resolution.
///
/// Square pixels are assumed: `fy` equals `fx` and the sensor height is not used.
///
/// # Arguments
///
/// * `camera` - The camera.
/// * `render_width` - The render width in pixels.
/// * `render_height` - The render height in pixels.
pub fn intrinsics(
    camera: &VirtualCamera,
    render_width: u32,
    render_height: u32,
) -> PinholeCameraIntrinsic {
    let fx = camera.lens.focal_length_mm * render_width as f64 / camera.lens.sensor_width_mm;
    PinholeCameraIntrinsic::new(
        (fx, fx),
        (render_width as f64 / 2.0, render_height as f64 / 2.0),
        (render_width, render_height),
    )
}

/// COLMAP camera models the exporter can emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraModel {
    /// fx, fy, cx, cy
    #[default]
    #[serde(rename = "PINHOLE")]
    Pinhole,
    /// fx, fy, cx, cy, k1, k2, p1, p2
    #[serde(rename = "OPENCV")]
    OpenCv,
}

impl CameraModel {
    /// The model name as written in cameras.txt.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModel::Pinhole => "PINHOLE",
            CameraModel::OpenCv => "OPENCV",
        }
    }

    /// Number of parameters of the model.
    pub fn num_params(&self) -> usize {
        match self {
            CameraModel::Pinhole => 4,
            CameraModel::OpenCv => 8,
        }
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PINHOLE" => Ok(CameraModel::Pinhole),
            "OPENCV" => Ok(CameraModel::OpenCv),
            _ => Err(format!("Unsupported camera model: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera(fov: f64, resolution: Resolution) -> VirtualCamera {
        VirtualCamera {
            name: "Camera_1".to_string(),
            position: DVec3::ZERO,
            rotation: Rotation::IDENTITY,
            fov,
            lens: Lens::from_fov(fov, DEFAULT_SENSOR_WIDTH_MM, resolution.aspect_ratio()),
            resolution,
        }
    }

    #[test]
    fn test_intrinsics_from_lens() {
        let cam = VirtualCamera {
            lens: Lens {
                focal_length_mm: 50.0,
                sensor_width_mm: 36.0,
                sensor_height_mm: 24.0,
            },
            ..camera(1.0, Resolution::new(1920, 1080))
        };
        let k = intrinsics(&cam, 1920, 1080);
        assert_relative_eq!(k.focal_length.0, 50.0 * 1920.0 / 36.0);
        assert_eq!(k.focal_length.0, k.focal_length.1);
        assert_eq!(k.principal_point, (960.0, 540.0));
        assert_eq!(k.image_size, (1920, 1080));
    }

    #[test]
    fn test_intrinsics_match_fov() {
        let fov = 60f64.to_radians();
        let cam = camera(fov, Resolution::new(800, 600));
        let k = cam.intrinsics();
        // the sensor width spans the field of view
        assert_relative_eq!(
            2.0 * (400.0 / k.focal_length.0).atan(),
            fov,
            epsilon = 1e-12
        );
        assert_relative_eq!(cam.lens.sensor_height_mm, 27.0, epsilon = 1e-12);
    }

    #[test]
    fn test_params_per_model() {
        let k = PinholeCameraIntrinsic::new((10.0, 10.0), (4.0, 3.0), (8, 6));
        assert_eq!(k.params(CameraModel::Pinhole), vec![10.0, 10.0, 4.0, 3.0]);
        let opencv = k.params(CameraModel::OpenCv);
        assert_eq!(opencv.len(), CameraModel::OpenCv.num_params());
        assert!(opencv[4..].iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_camera_model_parse() {
        assert_eq!("opencv".parse::<CameraModel>(), Ok(CameraModel::OpenCv));
        assert_eq!(CameraModel::Pinhole.to_string(), "PINHOLE");
        assert!("FISHEYE".parse::<CameraModel>().is_err());
    }

    #[test]
    fn test_forward() {
        let cam = camera(1.0, Resolution::default());
        assert_eq!(cam.forward(), DVec3::NEG_Z);
    }
}
