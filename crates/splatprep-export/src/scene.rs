use std::path::PathBuf;

use splatprep_3d::{
    camera::{Resolution, VirtualCamera},
    mesh::MeshObject,
    transforms::Transform,
};

/// Error types for the scene module.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Object names are unique within a scene.
    #[error("An object named {0} already exists")]
    DuplicateName(String),
}

/// An object living in the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// Triangulated geometry.
    Mesh(MeshObject),
    /// A camera.
    Camera(VirtualCamera),
    /// A transform with no geometry.
    Empty {
        /// Object name.
        name: String,
        /// Object to world transform.
        transform: Transform,
    },
}

impl SceneObject {
    /// The unique name of the object.
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Mesh(mesh) => &mesh.name,
            SceneObject::Camera(camera) => &camera.name,
            SceneObject::Empty { name, .. } => name,
        }
    }

    /// A short label for the object type.
    pub fn kind(&self) -> &'static str {
        match self {
            SceneObject::Mesh(_) => "MESH",
            SceneObject::Camera(_) => "CAMERA",
            SceneObject::Empty { .. } => "EMPTY",
        }
    }

    /// The mesh, if the object is one.
    pub fn as_mesh(&self) -> Option<&MeshObject> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

impl From<MeshObject> for SceneObject {
    fn from(mesh: MeshObject) -> Self {
        SceneObject::Mesh(mesh)
    }
}

impl From<VirtualCamera> for SceneObject {
    fn from(camera: VirtualCamera) -> Self {
        SceneObject::Camera(camera)
    }
}

/// Points sampled on an object surface, attached to that object while they exist.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingArtifact {
    /// Artifact name, unique within the scene.
    pub name: String,
    /// Name of the sampled object.
    pub owner: String,
    /// Number of points requested.
    pub num_points: usize,
}

/// Output settings of the scene renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderSettings {
    /// Render resolution.
    pub resolution: Resolution,
    /// File the next render is written to.
    pub filepath: Option<PathBuf>,
    /// Name of the camera the scene is rendered from.
    pub active_camera: Option<String>,
}

/// A collection of named objects with render settings.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    artifacts: Vec<SamplingArtifact>,
    /// Render settings.
    pub render: RenderSettings,
}

impl Scene {
    /// Create an empty scene with default render settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: impl Into<SceneObject>) -> Result<(), SceneError> {
        let object = object.into();
        if self.get(object.name()).is_some() {
            return Err(SceneError::DuplicateName(object.name().to_string()));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Look up an object by name.
    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Remove an object by name.
    pub fn remove(&mut self, name: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.name() == name)?;
        Some(self.objects.remove(index))
    }

    /// All objects in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// All mesh objects in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = &MeshObject> {
        self.objects.iter().filter_map(SceneObject::as_mesh)
    }

    /// All cameras in insertion order.
    pub fn cameras(&self) -> impl Iterator<Item = &VirtualCamera> {
        self.objects.iter().filter_map(|o| match o {
            SceneObject::Camera(camera) => Some(camera),
            _ => None,
        })
    }

    /// Attach a sampling artifact.
    pub fn add_artifact(&mut self, artifact: SamplingArtifact) -> Result<(), SceneError> {
        if self.artifacts.iter().any(|a| a.name == artifact.name) {
            return Err(SceneError::DuplicateName(artifact.name));
        }
        self.artifacts.push(artifact);
        Ok(())
    }

    /// Detach a sampling artifact by name.
    pub fn remove_artifact(&mut self, name: &str) -> Option<SamplingArtifact> {
        let index = self.artifacts.iter().position(|a| a.name == name)?;
        Some(self.artifacts.remove(index))
    }

    /// The attached sampling artifacts.
    pub fn artifacts(&self) -> &[SamplingArtifact] {
        &self.artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splatprep_3d::mesh::TriangleMesh;

    #[test]
    fn test_scene_objects() -> Result<(), SceneError> {
        let mut scene = Scene::new();
        scene.add(MeshObject::new(
            "Cube",
            TriangleMesh::cube(1.0),
            Transform::IDENTITY,
        ))?;
        scene.add(SceneObject::Empty {
            name: "Pivot".to_string(),
            transform: Transform::IDENTITY,
        })?;

        assert_eq!(scene.objects().len(), 2);
        assert_eq!(scene.meshes().count(), 1);
        assert_eq!(scene.get("Pivot").map(SceneObject::kind), Some("EMPTY"));
        assert!(scene.get("Pivot").and_then(SceneObject::as_mesh).is_none());

        let duplicate = scene.add(SceneObject::Empty {
            name: "Cube".to_string(),
            transform: Transform::IDENTITY,
        });
        assert!(matches!(duplicate, Err(SceneError::DuplicateName(_))));

        assert!(scene.remove("Cube").is_some());
        assert!(scene.remove("Cube").is_none());
        assert_eq!(scene.meshes().count(), 0);
        Ok(())
    }

    #[test]
    fn test_scene_artifacts() -> Result<(), SceneError> {
        let mut scene = Scene::new();
        let artifact = SamplingArtifact {
            name: "Cube_samples".to_string(),
            owner: "Cube".to_string(),
            num_points: 10,
        };
        scene.add_artifact(artifact.clone())?;
        assert!(scene.add_artifact(artifact.clone()).is_err());
        assert_eq!(scene.remove_artifact("Cube_samples"), Some(artifact));
        assert!(scene.artifacts().is_empty());
        Ok(())
    }
}
