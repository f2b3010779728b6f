use std::{ops::RangeInclusive, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use splatprep_3d::{
    camera::{CameraModel, Resolution},
    pointcloud::PointColor,
    sampling::{DEFAULT_FOV_DEGREES, DEFAULT_SAFETY_MARGIN},
};

use crate::error::ExportError;

/// Allowed number of cameras per export.
pub const CAMERA_COUNT_RANGE: RangeInclusive<usize> = 1..=100;

/// Allowed number of sampled points per export.
pub const POINT_COUNT_RANGE: RangeInclusive<usize> = 1..=10000;

/// Largest render width or height, in pixels.
pub const MAX_RESOLUTION: u32 = 16384;

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "export_data";

/// Options of one export job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Name of the scene object to export.
    pub target: Option<String>,
    /// Directory receiving the tables and the `images` folder. Created if absent.
    pub output_directory: PathBuf,
    /// Number of cameras placed around the target.
    pub num_cameras: usize,
    /// Number of points sampled on the target surface.
    pub num_points: usize,
    /// Field of view in degrees.
    pub fov_degrees: f64,
    /// Multiplier applied to the framing distance.
    pub safety_margin: f64,
    /// Render resolution, the scene resolution when unset.
    pub resolution: Option<Resolution>,
    /// Camera model written to cameras.txt.
    pub camera_model: CameraModel,
    /// Colors written to points3D.txt.
    pub point_color: PointColor,
    /// Seed of the surface sampler and of random point colors.
    pub seed: u64,
    /// Whether to render one image per camera.
    pub render_images: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target: None,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            num_cameras: 10,
            num_points: 1000,
            fov_degrees: DEFAULT_FOV_DEGREES,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            resolution: None,
            camera_model: CameraModel::default(),
            point_color: PointColor::default(),
            seed: 0,
            render_images: true,
        }
    }
}

impl ExportConfig {
    /// Load a config from a JSON file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Check the numeric options against their bounds.
    pub fn validate(&self) -> Result<(), ExportError> {
        if !CAMERA_COUNT_RANGE.contains(&self.num_cameras) {
            return Err(ExportError::InvalidInput(format!(
                "number of cameras {} is outside {:?}",
                self.num_cameras, CAMERA_COUNT_RANGE
            )));
        }
        if !POINT_COUNT_RANGE.contains(&self.num_points) {
            return Err(ExportError::InvalidInput(format!(
                "number of points {} is outside {:?}",
                self.num_points, POINT_COUNT_RANGE
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ExportError::InvalidInput(format!(
                "field of view {} is outside (0, 180) degrees",
                self.fov_degrees
            )));
        }
        if !(self.safety_margin > 0.0 && self.safety_margin.is_finite()) {
            return Err(ExportError::InvalidInput(format!(
                "safety margin {} must be positive",
                self.safety_margin
            )));
        }
        if let Some(resolution) = self.resolution {
            check_resolution(resolution)?;
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(ExportError::InvalidInput(
                "output directory is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that `resolution` is non zero and at most [`MAX_RESOLUTION`] per side.
pub fn check_resolution(resolution: Resolution) -> Result<(), ExportError> {
    if !resolution.is_valid() {
        return Err(ExportError::InvalidInput(format!(
            "render resolution {} has a zero dimension",
            resolution
        )));
    }
    if resolution.width > MAX_RESOLUTION || resolution.height > MAX_RESOLUTION {
        return Err(ExportError::InvalidInput(format!(
            "render resolution {} exceeds {} pixels per side",
            resolution, MAX_RESOLUTION
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() -> Result<(), ExportError> {
        let config = ExportConfig::default();
        assert_eq!(config.num_cameras, 10);
        assert_eq!(config.num_points, 1000);
        assert_eq!(config.fov_degrees, 60.0);
        assert_eq!(config.safety_margin, 2.0);
        assert_eq!(config.output_directory, PathBuf::from("export_data"));
        assert_eq!(config.camera_model, CameraModel::Pinhole);
        config.validate()
    }

    #[test]
    fn test_validate_bounds() {
        let cases = [
            ExportConfig {
                num_cameras: 0,
                ..Default::default()
            },
            ExportConfig {
                num_cameras: 101,
                ..Default::default()
            },
            ExportConfig {
                num_points: 0,
                ..Default::default()
            },
            ExportConfig {
                num_points: 10001,
                ..Default::default()
            },
            ExportConfig {
                fov_degrees: 180.0,
                ..Default::default()
            },
            ExportConfig {
                safety_margin: 0.0,
                ..Default::default()
            },
            ExportConfig {
                resolution: Some(Resolution::new(0, 10)),
                ..Default::default()
            },
            ExportConfig {
                resolution: Some(Resolution::new(MAX_RESOLUTION + 1, 10)),
                ..Default::default()
            },
            ExportConfig {
                resolution: Some(Resolution::new(u32::MAX, u32::MAX)),
                ..Default::default()
            },
        ];
        for config in cases {
            let err = config.validate().err();
            assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::InvalidInput));
        }

        let edges = ExportConfig {
            num_cameras: 100,
            num_points: 1,
            ..Default::default()
        };
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("export.json");
        std::fs::write(
            &path,
            r#"{
                "target": "Suzanne",
                "num_cameras": 24,
                "resolution": { "width": 1920, "height": 1080 },
                "camera_model": "OPENCV",
                "point_color": "random"
            }"#,
        )?;

        let config = ExportConfig::from_json_file(&path)?;
        assert_eq!(config.target.as_deref(), Some("Suzanne"));
        assert_eq!(config.num_cameras, 24);
        assert_eq!(config.num_points, 1000);
        assert_eq!(config.resolution, Some(Resolution::new(1920, 1080)));
        assert_eq!(config.camera_model, CameraModel::OpenCv);
        assert_eq!(config.point_color, PointColor::Random);

        std::fs::write(&path, r#"{ "num_cameras": "many" }"#)?;
        let err = ExportConfig::from_json_file(&path).err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::InvalidInput));
        Ok(())
    }
}
