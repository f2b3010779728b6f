use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use splatprep_3d::{
    camera::{intrinsics, Resolution, VirtualCamera},
    convention::to_colmap_pose,
    io::colmap::{ColmapCamera, ColmapImage, ColmapPoint3d, ColmapTextWriter},
    mesh::MeshObject,
    pointcloud::PointCloud,
    sampling::{place_cameras, sample_surface_points, AreaWeightedSampler, SurfaceSampler},
};
use splatprep_render::{raster::SoftwareRenderer, Renderer};

use crate::{
    config::{check_resolution, ExportConfig},
    error::ExportError,
    scene::{SamplingArtifact, Scene, SceneObject},
    session::SceneSession,
};

/// Name of the folder receiving the rendered images.
pub const IMAGES_DIR: &str = "images";

/// Stages of an export job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    /// Nothing has run yet.
    Idle,
    /// Checking the options and the target.
    Validating,
    /// Sampling points and placing cameras.
    Sampling,
    /// Rendering one image per camera.
    Rendering,
    /// Converting poses and writing the tables.
    ConvertingAndWriting,
    /// Removing the cameras and artifacts and restoring render settings.
    Cleanup,
    /// The job succeeded.
    Done,
    /// The job failed with the given reason.
    Error(String),
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportState::Idle => write!(f, "Idle"),
            ExportState::Validating => write!(f, "Validating"),
            ExportState::Sampling => write!(f, "Sampling"),
            ExportState::Rendering => write!(f, "Rendering"),
            ExportState::ConvertingAndWriting => write!(f, "Converting&Writing"),
            ExportState::Cleanup => write!(f, "Cleanup"),
            ExportState::Done => write!(f, "Done"),
            ExportState::Error(reason) => write!(f, "Error({})", reason),
        }
    }
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// The output directory.
    pub output_directory: PathBuf,
    /// The written tables: cameras.txt, images.txt and points3D.txt.
    pub table_paths: Vec<PathBuf>,
    /// The rendered images, in camera order. Empty when rendering is disabled.
    pub image_paths: Vec<PathBuf>,
    /// Number of exported cameras.
    pub num_cameras: usize,
    /// Number of exported points.
    pub num_points: usize,
}

/// Name of the image rendered from camera `index`.
pub fn image_name(index: usize) -> String {
    format!("frame_{:05}.png", index)
}

/// Runs export jobs against a scene.
///
/// The renderer and the surface sampler are pluggable. By default points are sampled
/// with an [`AreaWeightedSampler`] seeded from the config and images are rendered
/// with a [`SoftwareRenderer`].
pub struct Exporter<R = SoftwareRenderer, S = AreaWeightedSampler> {
    config: ExportConfig,
    renderer: R,
    sampler: S,
    state: ExportState,
    transitions: Vec<ExportState>,
}

impl Exporter {
    /// Create an exporter with the default renderer and sampler.
    pub fn new(config: ExportConfig) -> Self {
        let sampler = AreaWeightedSampler::new(config.seed);
        Self::with_parts(config, SoftwareRenderer::default(), sampler)
    }
}

impl<R: Renderer, S: SurfaceSampler> Exporter<R, S> {
    /// Create an exporter with the given renderer and sampler.
    pub fn with_parts(config: ExportConfig, renderer: R, sampler: S) -> Self {
        Self {
            config,
            renderer,
            sampler,
            state: ExportState::Idle,
            transitions: vec![ExportState::Idle],
        }
    }

    /// The job options.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The current state.
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn transitions(&self) -> &[ExportState] {
        &self.transitions
    }

    /// Run the export job on `scene`.
    ///
    /// Invalid input is reported before the scene or the filesystem is touched. Once
    /// sampling has started, the cameras and sampling artifacts added to the scene are
    /// removed and the render settings restored, whether the job succeeds or not.
    pub fn run(&mut self, scene: &mut Scene) -> Result<ExportReport, ExportError> {
        let result = self.run_stages(scene);
        match &result {
            Ok(report) => {
                self.enter(ExportState::Done);
                log::info!(
                    "exported {} cameras and {} points to {}",
                    report.num_cameras,
                    report.num_points,
                    report.output_directory.display()
                );
            }
            Err(err) => {
                log::error!("export failed: {}", err);
                self.enter(ExportState::Error(err.to_string()));
            }
        }
        result
    }

    fn run_stages(&mut self, scene: &mut Scene) -> Result<ExportReport, ExportError> {
        self.enter(ExportState::Validating);
        self.config.validate()?;
        let target = resolve_target(scene, self.config.target.as_deref())?;
        target
            .validate()
            .map_err(|e| ExportError::InvalidInput(format!("{}: {}", target.name, e)))?;
        let resolution = self.config.resolution.unwrap_or(scene.render.resolution);
        check_resolution(resolution)?;
        // the ephemeral cameras must not collide with existing objects
        if let Some(name) = (1..=self.config.num_cameras)
            .map(|i| format!("Camera_{}", i))
            .find(|name| scene.get(name).is_some())
        {
            return Err(ExportError::InvalidInput(format!(
                "an object named {} already exists",
                name
            )));
        }
        let artifact = artifact_name(&target.name);
        if scene.artifacts().iter().any(|a| a.name == artifact) {
            return Err(ExportError::InvalidInput(format!(
                "a sampling artifact named {} already exists",
                artifact
            )));
        }

        self.enter(ExportState::Sampling);
        let mut session = SceneSession::acquire(scene);
        let result = self.run_in_session(&mut session, &target, resolution);

        self.enter(ExportState::Cleanup);
        session.release();
        result
    }

    fn run_in_session(
        &mut self,
        session: &mut SceneSession,
        target: &MeshObject,
        resolution: Resolution,
    ) -> Result<ExportReport, ExportError> {
        session
            .add_artifact(SamplingArtifact {
                name: artifact_name(&target.name),
                owner: target.name.clone(),
                num_points: self.config.num_points,
            })
            .map_err(|e| ExportError::InvalidInput(e.to_string()))?;
        let points = sample_surface_points(target, &self.sampler, self.config.num_points)?;

        let cameras = place_cameras(
            target,
            self.config.num_cameras,
            self.config.fov_degrees,
            self.config.safety_margin,
            resolution,
        )?;
        for camera in &cameras {
            session
                .add_camera(camera.clone())
                .map_err(|e| ExportError::InvalidInput(e.to_string()))?;
        }

        let output_directory = self.config.output_directory.clone();
        fs::create_dir_all(&output_directory)?;

        let image_paths = if self.config.render_images {
            self.enter(ExportState::Rendering);
            self.render_images(session, &cameras, resolution, &output_directory)?
        } else {
            Vec::new()
        };

        self.enter(ExportState::ConvertingAndWriting);
        let num_points = points.len();
        let table_paths = self.write_tables(&cameras, points, resolution, &output_directory)?;

        Ok(ExportReport {
            output_directory,
            table_paths,
            image_paths,
            num_cameras: cameras.len(),
            num_points,
        })
    }

    fn render_images(
        &mut self,
        session: &mut SceneSession,
        cameras: &[VirtualCamera],
        resolution: Resolution,
        output_directory: &Path,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let images_directory = output_directory.join(IMAGES_DIR);
        fs::create_dir_all(&images_directory)?;
        session.set_resolution(resolution);

        let mut image_paths = Vec::with_capacity(cameras.len());
        for (i, camera) in cameras.iter().enumerate() {
            let path = images_directory.join(image_name(i));
            session.set_render_target(&camera.name, path.clone());

            let objects = session.scene().meshes().collect::<Vec<_>>();
            self.renderer.render(camera, &objects, &path)?;
            log::debug!("rendered {} to {}", camera.name, path.display());
            image_paths.push(path);
        }
        Ok(image_paths)
    }

    fn write_tables(
        &self,
        cameras: &[VirtualCamera],
        points: Vec<[f64; 3]>,
        resolution: Resolution,
        output_directory: &Path,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let model = self.config.camera_model;

        let mut colmap_cameras = Vec::with_capacity(cameras.len());
        let mut colmap_images = Vec::with_capacity(cameras.len());
        for (i, camera) in cameras.iter().enumerate() {
            let k = intrinsics(camera, resolution.width, resolution.height);
            colmap_cameras.push(ColmapCamera {
                camera_id: i as u32,
                model_id: model.into(),
                width: resolution.width as usize,
                height: resolution.height as usize,
                params: k.params(model),
            });

            let pose = to_colmap_pose(camera);
            colmap_images.push(ColmapImage {
                name: image_name(i),
                image_id: i as u32 + 1,
                camera_id: i as u32,
                rotation: pose.qvec,
                translation: pose.tvec,
                points2d: Vec::new(),
            });
        }

        let cloud = PointCloud::with_point_color(points, self.config.point_color, self.config.seed);
        let colmap_points = cloud
            .points()
            .iter()
            .enumerate()
            .map(|(i, xyz)| ColmapPoint3d {
                point3d_id: i as u64,
                xyz: *xyz,
                rgb: cloud.color(i),
                error: 1.0,
                // placeholder track, no 2D observations are computed
                track: vec![(0, i as u32), (1, i as u32)],
            })
            .collect::<Vec<_>>();

        let mut writer = ColmapTextWriter::new(output_directory);
        writer.stage_cameras(&colmap_cameras)?;
        writer.stage_images(&colmap_images)?;
        writer.stage_points3d(&colmap_points)?;
        Ok(writer.commit()?)
    }

    fn enter(&mut self, state: ExportState) {
        log::info!("export state: {} -> {}", self.state, state);
        self.transitions.push(state.clone());
        self.state = state;
    }
}

/// Name of the sampling artifact attached to `target` during an export.
pub fn artifact_name(target: &str) -> String {
    format!("{}_samples", target)
}

fn resolve_target(scene: &Scene, name: Option<&str>) -> Result<MeshObject, ExportError> {
    let name = name
        .ok_or_else(|| ExportError::InvalidInput("no target object selected".to_string()))?;
    match scene.get(name) {
        Some(SceneObject::Mesh(mesh)) => Ok(mesh.clone()),
        Some(other) => Err(ExportError::InvalidInput(format!(
            "{} is a {} object, not a mesh",
            name,
            other.kind()
        ))),
        None => Err(ExportError::InvalidInput(format!(
            "no object named {} in the scene",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name() {
        assert_eq!(image_name(0), "frame_00000.png");
        assert_eq!(image_name(42), "frame_00042.png");
        assert_eq!(image_name(99999), "frame_99999.png");
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("Cube"), "Cube_samples");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ExportState::ConvertingAndWriting.to_string(), "Converting&Writing");
        assert_eq!(
            ExportState::Error("boom".to_string()).to_string(),
            "Error(boom)"
        );
    }

    #[test]
    fn test_resolve_target() {
        let scene = Scene::new();
        let missing = resolve_target(&scene, Some("Cube"));
        assert!(matches!(missing, Err(ExportError::InvalidInput(_))));
        let unset = resolve_target(&scene, None);
        assert!(matches!(unset, Err(ExportError::InvalidInput(_))));
    }
}
