/// Colmap reader and writer module.
pub mod colmap;

/// Wavefront OBJ reader module.
pub mod obj;
