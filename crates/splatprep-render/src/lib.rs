#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use crate::error::{ImageError, RenderError};

/// Image container.
pub mod image;

/// PNG image encoding and decoding.
pub mod png;

/// CPU triangle rasterizer.
pub mod raster;

use std::path::Path;

use splatprep_3d::{camera::VirtualCamera, mesh::MeshObject};

/// The capability to render a camera view of a scene into an image file.
///
/// The resolution is taken from the camera. Implementations write an RGB image to
/// `file_path`, overwriting any existing file.
pub trait Renderer {
    /// Render `objects` as seen from `camera` into `file_path`.
    fn render(
        &mut self,
        camera: &VirtualCamera,
        objects: &[&MeshObject],
        file_path: &Path,
    ) -> Result<(), RenderError>;
}
