#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Virtual cameras and their intrinsics.
pub mod camera;

/// Conversion from the authoring convention to the COLMAP convention.
pub mod convention;

/// I/O utilities for reading and writing 3D data.
pub mod io;

/// Triangle meshes and mesh objects.
pub mod mesh;

/// Point cloud container.
pub mod pointcloud;

/// Unit quaternion rotations.
pub mod rotation;

/// Camera placement and surface point sampling.
pub mod sampling;

/// Object transforms.
pub mod transforms;
