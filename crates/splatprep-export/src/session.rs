use std::path::PathBuf;

use splatprep_3d::camera::{Resolution, VirtualCamera};

use crate::scene::{RenderSettings, SamplingArtifact, Scene, SceneError};

/// Exclusive access to a scene for the duration of an export.
///
/// Every camera and sampling artifact added through the session, and every change to
/// the render settings, is undone by [`SceneSession::release`] or when the session is
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct SceneSession<'a> {
    scene: &'a mut Scene,
    saved_render: Option<RenderSettings>,
    cameras: Vec<String>,
    artifacts: Vec<String>,
}

impl<'a> SceneSession<'a> {
    /// Start a session, saving the current render settings.
    pub fn acquire(scene: &'a mut Scene) -> Self {
        let saved_render = Some(scene.render.clone());
        Self {
            scene,
            saved_render,
            cameras: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Read access to the scene.
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Add a camera owned by the session.
    pub fn add_camera(&mut self, camera: VirtualCamera) -> Result<(), SceneError> {
        let name = camera.name.clone();
        self.scene.add(camera)?;
        self.cameras.push(name);
        Ok(())
    }

    /// Attach a sampling artifact owned by the session.
    pub fn add_artifact(&mut self, artifact: SamplingArtifact) -> Result<(), SceneError> {
        let name = artifact.name.clone();
        self.scene.add_artifact(artifact)?;
        self.artifacts.push(name);
        Ok(())
    }

    /// Set the render resolution.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.scene.render.resolution = resolution;
    }

    /// Point the renderer at a camera and an output file.
    pub fn set_render_target(&mut self, camera: &str, filepath: PathBuf) {
        self.scene.render.active_camera = Some(camera.to_string());
        self.scene.render.filepath = Some(filepath);
    }

    /// Undo every mutation made through the session.
    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        for name in self.cameras.drain(..) {
            if self.scene.remove(&name).is_none() {
                log::warn!("camera {} was already removed from the scene", name);
            }
        }
        for name in self.artifacts.drain(..) {
            if self.scene.remove_artifact(&name).is_none() {
                log::warn!("sampling artifact {} was already removed", name);
            }
        }
        if let Some(render) = self.saved_render.take() {
            self.scene.render = render;
            log::debug!("scene restored");
        }
    }
}

impl Drop for SceneSession<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splatprep_3d::{
        mesh::{MeshObject, TriangleMesh},
        sampling::place_cameras,
        transforms::Transform,
    };

    fn scene_with_cube() -> Result<Scene, SceneError> {
        let mut scene = Scene::new();
        scene.add(MeshObject::new(
            "Cube",
            TriangleMesh::cube(1.0),
            Transform::IDENTITY,
        ))?;
        scene.render.resolution = Resolution::new(640, 480);
        Ok(scene)
    }

    fn mutate(session: &mut SceneSession) -> Result<(), Box<dyn std::error::Error>> {
        let target = session
            .scene()
            .meshes()
            .next()
            .cloned()
            .ok_or("no mesh")?;
        for camera in place_cameras(&target, 3, 60.0, 2.0, Resolution::new(64, 64))? {
            session.add_camera(camera)?;
        }
        session.add_artifact(SamplingArtifact {
            name: "Cube_samples".to_string(),
            owner: "Cube".to_string(),
            num_points: 5,
        })?;
        session.set_resolution(Resolution::new(64, 64));
        session.set_render_target("Camera_1", PathBuf::from("frame_00000.png"));
        Ok(())
    }

    #[test]
    fn test_release_restores_scene() -> Result<(), Box<dyn std::error::Error>> {
        let mut scene = scene_with_cube()?;
        let before = scene.render.clone();

        let mut session = SceneSession::acquire(&mut scene);
        mutate(&mut session)?;
        assert_eq!(session.scene().cameras().count(), 3);
        assert_eq!(session.scene().artifacts().len(), 1);
        session.release();

        assert_eq!(scene.objects().len(), 1);
        assert!(scene.artifacts().is_empty());
        assert_eq!(scene.render, before);
        Ok(())
    }

    #[test]
    fn test_drop_restores_scene() -> Result<(), Box<dyn std::error::Error>> {
        let mut scene = scene_with_cube()?;
        let before = scene.render.clone();

        let result = (|| {
            let mut session = SceneSession::acquire(&mut scene);
            mutate(&mut session)?;
            Err::<(), Box<dyn std::error::Error>>("render failed".into())
        })();
        assert!(result.is_err());

        assert_eq!(scene.cameras().count(), 0);
        assert!(scene.artifacts().is_empty());
        assert_eq!(scene.render, before);
        Ok(())
    }

    #[test]
    fn test_duplicate_camera_is_not_tracked() -> Result<(), Box<dyn std::error::Error>> {
        let mut scene = scene_with_cube()?;
        let target = scene.meshes().next().cloned().ok_or("no mesh")?;
        let camera = place_cameras(&target, 1, 60.0, 2.0, Resolution::new(64, 64))?.remove(0);
        scene.add(camera.clone())?;

        let mut session = SceneSession::acquire(&mut scene);
        assert!(session.add_camera(camera).is_err());
        session.release();

        // the pre-existing camera is not owned by the session
        assert_eq!(scene.cameras().count(), 1);
        Ok(())
    }
}
