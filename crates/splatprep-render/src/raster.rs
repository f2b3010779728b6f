use std::path::Path;

use glam::{DVec2, DVec3};
use splatprep_3d::{camera::VirtualCamera, mesh::MeshObject};

use crate::{
    error::RenderError,
    image::{Image, ImageSize},
    png::write_image_png_rgb8,
    Renderer,
};

// points closer than this to the camera plane are dropped
const NEAR_CLIP: f64 = 1e-6;

/// Flat shading parameters of the [`SoftwareRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    /// Color of pixels not covered by any triangle.
    pub background: [u8; 3],
    /// Surface albedo.
    pub base_color: [u8; 3],
    /// Light contribution independent of the surface orientation, in `[0, 1]`.
    pub ambient: f64,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            base_color: [200, 200, 200],
            ambient: 0.2,
        }
    }
}

/// A z-buffered triangle rasterizer with a headlight.
///
/// Each face is shaded with the Lambert term between its normal and the viewing ray,
/// so faces are visible from both sides.
#[derive(Debug, Clone, Default)]
pub struct SoftwareRenderer {
    /// Shading parameters.
    pub shading: Shading,
}

impl SoftwareRenderer {
    /// Create a renderer with the given shading.
    pub fn new(shading: Shading) -> Self {
        Self { shading }
    }

    /// Rasterize `objects` as seen from `camera` at the camera resolution.
    pub fn render_image(
        &self,
        camera: &VirtualCamera,
        objects: &[&MeshObject],
    ) -> Result<Image<u8, 3>, RenderError> {
        let size = ImageSize::from(camera.resolution);
        let mut frame = Frame::new(size, self.shading.background)?;

        let intrinsics = camera.intrinsics();
        let (fx, fy) = intrinsics.focal_length;
        let (cx, cy) = intrinsics.principal_point;
        let world_to_camera = camera.rotation.inverse();

        for object in objects {
            let world = object.world_vertices();

            // (pixel position, inverse depth) per vertex, None when behind the camera
            let projected = world
                .iter()
                .map(|p| {
                    let pc = world_to_camera.rotate(DVec3::from_array(*p) - camera.position);
                    let depth = -pc.z;
                    (depth > NEAR_CLIP).then(|| {
                        (
                            DVec2::new(fx * pc.x / depth + cx, cy - fy * pc.y / depth),
                            1.0 / depth,
                        )
                    })
                })
                .collect::<Vec<_>>();

            for face in object.mesh.faces() {
                let (Some(a), Some(b), Some(c)) = (
                    projected[face[0]],
                    projected[face[1]],
                    projected[face[2]],
                ) else {
                    continue;
                };

                let [p0, p1, p2] = face.map(|i| DVec3::from_array(world[i]));
                let normal = (p1 - p0).cross(p2 - p0);
                if normal.length_squared() == 0.0 {
                    continue;
                }
                let view = ((p0 + p1 + p2) / 3.0 - camera.position).normalize_or_zero();
                let lambert = normal.normalize().dot(view).abs();
                let color = self.shade(lambert);

                frame.fill_triangle([a, b, c], color);
            }
        }

        log::debug!(
            "rasterized {} objects for {} at {}",
            objects.len(),
            camera.name,
            size
        );

        Ok(frame.color)
    }

    fn shade(&self, lambert: f64) -> [u8; 3] {
        let ambient = self.shading.ambient.clamp(0.0, 1.0);
        let intensity = ambient + (1.0 - ambient) * lambert;
        self.shading
            .base_color
            .map(|c| (c as f64 * intensity).round().clamp(0.0, 255.0) as u8)
    }
}

impl Renderer for SoftwareRenderer {
    fn render(
        &mut self,
        camera: &VirtualCamera,
        objects: &[&MeshObject],
        file_path: &Path,
    ) -> Result<(), RenderError> {
        let image = self.render_image(camera, objects)?;
        write_image_png_rgb8(file_path, &image)
    }
}

struct Frame {
    color: Image<u8, 3>,
    // inverse depth, larger is closer
    inv_depth: Vec<f64>,
}

impl Frame {
    fn new(size: ImageSize, background: [u8; 3]) -> Result<Self, RenderError> {
        let mut color = Image::<u8, 3>::from_size_val(size, 0)?;
        color
            .as_slice_mut()
            .chunks_exact_mut(3)
            .for_each(|px| px.copy_from_slice(&background));
        Ok(Self {
            color,
            inv_depth: vec![0.0; size.width * size.height],
        })
    }

    fn fill_triangle(&mut self, vertices: [(DVec2, f64); 3], color: [u8; 3]) {
        let [(a, za), (b, zb), (c, zc)] = vertices;
        let area = edge(a, b, c);
        if area.abs() < f64::EPSILON {
            return;
        }

        let width = self.color.cols();
        let height = self.color.rows();
        let min = a.min(b).min(c).floor().max(DVec2::ZERO);
        let max = a.max(b).max(c).ceil();
        let x_end = (max.x.max(0.0) as usize).min(width);
        let y_end = (max.y.max(0.0) as usize).min(height);

        for y in min.y as usize..y_end {
            for x in min.x as usize..x_end {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // inverse depth is affine in screen space
                let z = w0 * za + w1 * zb + w2 * zc;
                let idx = y * width + x;
                if z <= self.inv_depth[idx] {
                    continue;
                }
                self.inv_depth[idx] = z;
                self.color.as_slice_mut()[idx * 3..idx * 3 + 3].copy_from_slice(&color);
            }
        }
    }
}

// twice the signed area of the triangle (a, b, p)
fn edge(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}
