use glam::DVec3;

use crate::transforms::Transform;

/// Error types for the mesh module.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("Mesh has no vertices")]
    NoVertices,

    /// The mesh has no faces.
    #[error("Mesh has no faces")]
    NoFaces,

    /// A face references a vertex that does not exist.
    #[error("Face {face} references vertex {index} but the mesh has {num_vertices} vertices")]
    FaceIndexOutOfRange {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        num_vertices: usize,
    },

    /// The world-space bounding box has zero extent.
    #[error("Mesh bounding box is degenerate (diagonal {0})")]
    DegenerateBounds(f64),
}

/// An axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl BoundingBox {
    /// Compute the bounding box of a set of points, `None` if empty.
    pub fn from_points(points: &[[f64; 3]]) -> Option<Self> {
        let first = DVec3::from_array(*points.first()?);
        let (min, max) = points
            .iter()
            .map(|p| DVec3::from_array(*p))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a.x, a.y, a.z],
            [a.x, a.y, b.z],
            [a.x, b.y, b.z],
            [a.x, b.y, a.z],
            [b.x, a.y, a.z],
            [b.x, a.y, b.z],
            [b.x, b.y, b.z],
            [b.x, b.y, a.z],
        ]
    }
}

/// A triangulated mesh in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and triangle indices.
    ///
    /// Every face index must reference an existing vertex.
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face,
                    index,
                    num_vertices: vertices.len(),
                });
            }
        }
        Ok(Self { vertices, faces })
    }

    /// An axis aligned cube centered at the origin with the given edge length.
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ];
        // counter clockwise seen from outside
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        Self { vertices, faces }
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get as reference the vertices.
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Get as reference the triangle indices.
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// The three corners of a triangle.
    pub fn triangle(&self, face: usize) -> [DVec3; 3] {
        let [a, b, c] = self.faces[face];
        [
            DVec3::from_array(self.vertices[a]),
            DVec3::from_array(self.vertices[b]),
            DVec3::from_array(self.vertices[c]),
        ]
    }

    /// The area of a triangle.
    pub fn face_area(&self, face: usize) -> f64 {
        let [a, b, c] = self.triangle(face);
        0.5 * (b - a).cross(c - a).length()
    }

    /// Bounding box in object space.
    pub fn local_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }
}

/// A named mesh placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshObject {
    /// Object name.
    pub name: String,
    /// Geometry in object space.
    pub mesh: TriangleMesh,
    /// Object to world transform.
    pub transform: Transform,
}

impl MeshObject {
    /// Create a new mesh object.
    pub fn new(name: impl Into<String>, mesh: TriangleMesh, transform: Transform) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
        }
    }

    /// The mesh vertices in world space.
    pub fn world_vertices(&self) -> Vec<[f64; 3]> {
        self.transform.transform_points(self.mesh.vertices())
    }

    /// Mean of the world-space vertices.
    pub fn world_centroid(&self) -> Result<DVec3, MeshError> {
        let vertices = self.world_vertices();
        if vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        let sum = vertices
            .iter()
            .fold(DVec3::ZERO, |acc, p| acc + DVec3::from_array(*p));
        Ok(sum / vertices.len() as f64)
    }

    /// Length of the bounding box diagonal in world space.
    ///
    /// The object-space box corners are moved to world space and the largest
    /// pairwise distance among them is returned.
    pub fn world_bounds_diagonal(&self) -> Result<f64, MeshError> {
        let bounds = self.mesh.local_bounds().ok_or(MeshError::NoVertices)?;
        let corners = self.transform.transform_points(&bounds.corners());

        let mut diagonal: f64 = 0.0;
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                diagonal = diagonal.max(DVec3::from_array(*a).distance(DVec3::from_array(*b)));
            }
        }
        Ok(diagonal)
    }

    /// Check the object can be sampled and framed by cameras.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.mesh.num_vertices() == 0 {
            return Err(MeshError::NoVertices);
        }
        if self.mesh.num_faces() == 0 {
            return Err(MeshError::NoFaces);
        }
        let diagonal = self.world_bounds_diagonal()?;
        if !diagonal.is_finite() || diagonal <= f64::EPSILON {
            return Err(MeshError::DegenerateBounds(diagonal));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mesh_rejects_bad_index() {
        let res = TriangleMesh::new(vec![[0.0; 3]; 2], vec![[0, 1, 2]]);
        assert!(matches!(
            res,
            Err(MeshError::FaceIndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_cube_geometry() {
        let cube = TriangleMesh::cube(2.0);
        assert_eq!(cube.num_vertices(), 8);
        assert_eq!(cube.num_faces(), 12);
        let area = (0..cube.num_faces()).map(|f| cube.face_area(f)).sum::<f64>();
        assert_relative_eq!(area, 24.0, epsilon = 1e-12);

        // every face normal points away from the center
        for f in 0..cube.num_faces() {
            let [a, b, c] = cube.triangle(f);
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "face {f} is inverted");
        }
    }

    #[test]
    fn test_world_centroid_and_diagonal() -> Result<(), MeshError> {
        let object = MeshObject::new(
            "cube",
            TriangleMesh::cube(1.0),
            Transform::new(
                DVec3::new(1.0, 2.0, 3.0),
                crate::rotation::Rotation::from_euler_xyz([0.3, 0.2, 0.1]),
                DVec3::splat(2.0),
            ),
        );
        let centroid = object.world_centroid()?;
        assert_relative_eq!(centroid.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.z, 3.0, epsilon = 1e-12);

        // rotation does not change the diagonal, scale does
        assert_relative_eq!(
            object.world_bounds_diagonal()?,
            2.0 * 3f64.sqrt(),
            epsilon = 1e-12
        );
        Ok(())
    }

    #[test]
    fn test_validate() {
        let empty = MeshObject::new("empty", TriangleMesh::default(), Transform::IDENTITY);
        assert!(matches!(empty.validate(), Err(MeshError::NoVertices)));

        let flat = MeshObject::new(
            "points",
            TriangleMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![])
                .expect("no faces to check"),
            Transform::IDENTITY,
        );
        assert!(matches!(flat.validate(), Err(MeshError::NoFaces)));

        let collapsed = MeshObject::new(
            "collapsed",
            TriangleMesh::cube(1.0),
            Transform::new(DVec3::ZERO, Default::default(), DVec3::ZERO),
        );
        assert!(matches!(
            collapsed.validate(),
            Err(MeshError::DegenerateBounds(_))
        ));
    }
}
