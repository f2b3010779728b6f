use std::f64::consts::PI;

use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    camera::{Lens, Resolution, VirtualCamera, DEFAULT_SENSOR_WIDTH_MM},
    mesh::{MeshError, MeshObject, TriangleMesh},
    rotation::Rotation,
};

/// Default field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f64 = 60.0;

/// Default multiplier applied to the framing distance.
pub const DEFAULT_SAFETY_MARGIN: f64 = 2.0;

/// Error types for the sampling module.
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    /// At least one camera is required.
    #[error("Invalid number of cameras: {0}")]
    InvalidCameraCount(usize),

    /// At least one point is required.
    #[error("Invalid number of points: {0}")]
    InvalidPointCount(usize),

    /// The field of view must lie in the open interval (0, 180) degrees.
    #[error("Invalid field of view: {0} degrees")]
    InvalidFov(f64),

    /// The safety margin must be positive.
    #[error("Invalid safety margin: {0}")]
    InvalidSafetyMargin(f64),

    /// The render resolution has a zero dimension.
    #[error("Invalid render resolution: {0}")]
    InvalidResolution(Resolution),

    /// The target cannot be sampled or framed.
    #[error("Invalid target mesh. {0}")]
    InvalidTarget(#[from] MeshError),

    /// The surface sampler produced nothing.
    #[error("Surface sampler returned no points")]
    EmptySample,

    /// The surface sampler returned a different number of points than requested.
    #[error("Surface sampler returned {got} points, expected {expected}")]
    SampleCountMismatch {
        /// Requested number of points.
        expected: usize,
        /// Returned number of points.
        got: usize,
    },
}

impl SamplingError {
    /// Whether the error comes from the inputs rather than from the sampler.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(
            self,
            SamplingError::EmptySample | SamplingError::SampleCountMismatch { .. }
        )
    }
}

/// Unit directions on a Fibonacci sphere.
///
/// Point `i` has azimuth `golden_angle * i` and polar angle
/// `acos(1 - 2 * (i + 0.5) / count)`, so the points spiral from the north pole to
/// the south pole without clustering.
pub fn fibonacci_sphere(count: usize) -> Vec<DVec3> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    (0..count)
        .map(|i| {
            let theta = golden_angle * i as f64;
            let phi = (1.0 - 2.0 * (i as f64 + 0.5) / count as f64).acos();
            DVec3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            )
        })
        .collect()
}

/// Field of view spanned by the sensor width.
///
/// For landscape renders the given field of view is widened by the aspect ratio,
/// otherwise it is returned unchanged.
pub fn effective_fov(fov: f64, aspect_ratio: f64) -> f64 {
    if aspect_ratio > 1.0 {
        2.0 * ((fov / 2.0).tan() * aspect_ratio).atan()
    } else {
        fov
    }
}

/// Distance from the target center at which a camera frames a bounding box diagonal.
pub fn placement_distance(diagonal: f64, fov: f64, safety_margin: f64) -> f64 {
    (diagonal / 2.0) / (fov / 2.0).tan() * safety_margin
}

/// Place `count` cameras on a sphere around `target`, all looking at its centroid.
///
/// The placement is deterministic for fixed inputs.
///
/// # Arguments
///
/// * `target` - The object to frame.
/// * `count` - The number of cameras.
/// * `fov_degrees` - The field of view in degrees.
/// * `safety_margin` - Multiplier applied to the framing distance.
/// * `resolution` - The render resolution, used for the aspect ratio and the intrinsics.
///
/// # Returns
///
/// The cameras named `Camera_1` to `Camera_<count>`.
pub fn place_cameras(
    target: &MeshObject,
    count: usize,
    fov_degrees: f64,
    safety_margin: f64,
    resolution: Resolution,
) -> Result<Vec<VirtualCamera>, SamplingError> {
    if count < 1 {
        return Err(SamplingError::InvalidCameraCount(count));
    }
    if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
        return Err(SamplingError::InvalidFov(fov_degrees));
    }
    if !(safety_margin > 0.0 && safety_margin.is_finite()) {
        return Err(SamplingError::InvalidSafetyMargin(safety_margin));
    }
    if !resolution.is_valid() {
        return Err(SamplingError::InvalidResolution(resolution));
    }
    target.validate()?;

    let centroid = target.world_centroid()?;
    let diagonal = target.world_bounds_diagonal()?;

    let aspect_ratio = resolution.aspect_ratio();
    let fov = effective_fov(fov_degrees.to_radians(), aspect_ratio);
    let radius = placement_distance(diagonal, fov, safety_margin);

    log::debug!(
        "placing {} cameras at distance {} around {:?} (diagonal {}, fov {} rad)",
        count,
        radius,
        centroid,
        diagonal,
        fov
    );

    let lens = Lens::from_fov(fov, DEFAULT_SENSOR_WIDTH_MM, aspect_ratio);

    let cameras = fibonacci_sphere(count)
        .into_iter()
        .enumerate()
        .map(|(i, direction)| {
            let position = centroid + direction * radius;
            // track with local +Z, then flip about local X so local -Z looks at the target
            let rotation = Rotation::track_to(centroid - position)
                .unwrap_or_default()
                .rotate_local_x(PI)
                .canonical();
            VirtualCamera {
                name: format!("Camera_{}", i + 1),
                position,
                rotation,
                fov,
                lens,
                resolution,
            }
        })
        .collect();

    Ok(cameras)
}

/// Produces points distributed over a mesh surface.
pub trait SurfaceSampler {
    /// Sample `count` object-space points on the surface of `mesh`.
    ///
    /// An empty result signals a sampling failure.
    fn sample(&self, mesh: &TriangleMesh, count: usize) -> Vec<[f64; 3]>;
}

/// Uniform surface sampler: faces are picked proportionally to their area, points
/// are uniform inside each face.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaWeightedSampler {
    seed: u64,
}

impl AreaWeightedSampler {
    /// Create a sampler with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SurfaceSampler for AreaWeightedSampler {
    fn sample(&self, mesh: &TriangleMesh, count: usize) -> Vec<[f64; 3]> {
        // cumulative area table to pick faces by area
        let cumulative = (0..mesh.num_faces())
            .scan(0.0, |acc, f| {
                *acc += mesh.face_area(f);
                Some(*acc)
            })
            .collect::<Vec<_>>();

        let total_area = match cumulative.last() {
            Some(&area) if area > 0.0 && area.is_finite() => area,
            _ => return vec![],
        };

        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..count)
            .map(|_| {
                let u = rng.random::<f64>() * total_area;
                let face = cumulative
                    .partition_point(|&c| c <= u)
                    .min(cumulative.len() - 1);
                let [a, b, c] = mesh.triangle(face);

                let s = rng.random::<f64>().sqrt();
                let t = rng.random::<f64>();
                let p = a * (1.0 - s) + b * (s * (1.0 - t)) + c * (s * t);
                p.to_array()
            })
            .collect()
    }
}

/// Sample `count` points on the surface of `target` and move them to world space.
///
/// # Arguments
///
/// * `target` - The object to sample.
/// * `sampler` - The surface sampler working in object space.
/// * `count` - The number of points.
///
/// # Returns
///
/// The world-space points, exactly `count` of them.
pub fn sample_surface_points(
    target: &MeshObject,
    sampler: &dyn SurfaceSampler,
    count: usize,
) -> Result<Vec<[f64; 3]>, SamplingError> {
    if count < 1 {
        return Err(SamplingError::InvalidPointCount(count));
    }
    target.validate()?;

    let points = sampler.sample(&target.mesh, count);
    if points.is_empty() {
        return Err(SamplingError::EmptySample);
    }
    if points.len() != count {
        return Err(SamplingError::SampleCountMismatch {
            expected: count,
            got: points.len(),
        });
    }
    log::debug!("sampled {} points on {}", points.len(), target.name);

    Ok(target.transform.transform_points(&points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::Transform;
    use approx::assert_relative_eq;

    fn cube_at(center: DVec3) -> MeshObject {
        MeshObject::new(
            "cube",
            TriangleMesh::cube(1.0),
            Transform::from_translation(center),
        )
    }

    #[test]
    fn test_fibonacci_sphere_unit_and_distinct() {
        let dirs = fibonacci_sphere(300);
        assert_eq!(dirs.len(), 300);
        for (i, a) in dirs.iter().enumerate() {
            assert_relative_eq!(a.length(), 1.0, epsilon = 1e-12);
            for b in &dirs[i + 1..] {
                assert!(a.distance(*b) > 1e-6);
            }
        }
        // spiral goes from the north to the south pole
        assert!(dirs[0].z > 0.99);
        assert!(dirs[299].z < -0.99);
    }

    #[test]
    fn test_single_camera_on_equator() {
        let dirs = fibonacci_sphere(1);
        assert_relative_eq!(dirs[0].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dirs[0].z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_effective_fov() {
        let fov = 60f64.to_radians();
        assert_eq!(effective_fov(fov, 1.0), fov);
        assert_eq!(effective_fov(fov, 0.5), fov);
        let wide = effective_fov(fov, 16.0 / 9.0);
        assert_relative_eq!((wide / 2.0).tan(), (fov / 2.0).tan() * 16.0 / 9.0);
    }

    #[test]
    fn test_place_cameras_equidistant_and_looking_at_center() -> Result<(), SamplingError> {
        let center = DVec3::new(1.0, -2.0, 0.5);
        let cameras = place_cameras(&cube_at(center), 25, 60.0, 2.0, Resolution::new(640, 480))?;
        assert_eq!(cameras.len(), 25);

        let fov = effective_fov(60f64.to_radians(), 640.0 / 480.0);
        let radius = placement_distance(3f64.sqrt(), fov, 2.0);
        for (i, cam) in cameras.iter().enumerate() {
            assert_eq!(cam.name, format!("Camera_{}", i + 1));
            assert_relative_eq!(cam.position.distance(center), radius, epsilon = 1e-9);
            let to_center = (center - cam.position).normalize();
            assert_relative_eq!(cam.forward().dot(to_center), 1.0, epsilon = 1e-9);
            assert_eq!(cam.fov, fov);
        }
        Ok(())
    }

    #[test]
    fn test_place_cameras_deterministic() -> Result<(), SamplingError> {
        let target = cube_at(DVec3::ZERO);
        let a = place_cameras(&target, 8, 45.0, 1.5, Resolution::default())?;
        let b = place_cameras(&target, 8, 45.0, 1.5, Resolution::default())?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_place_cameras_invalid_input() {
        let target = cube_at(DVec3::ZERO);
        let res = Resolution::default();
        assert!(matches!(
            place_cameras(&target, 0, 60.0, 2.0, res),
            Err(SamplingError::InvalidCameraCount(0))
        ));
        assert!(matches!(
            place_cameras(&target, 1, 180.0, 2.0, res),
            Err(SamplingError::InvalidFov(_))
        ));
        assert!(matches!(
            place_cameras(&target, 1, 60.0, 0.0, res),
            Err(SamplingError::InvalidSafetyMargin(_))
        ));
        let empty = MeshObject::new("empty", TriangleMesh::default(), Transform::IDENTITY);
        let err = place_cameras(&empty, 1, 60.0, 2.0, res).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_area_weighted_sampler_on_surface() {
        let mesh = TriangleMesh::cube(2.0);
        let points = AreaWeightedSampler::new(3).sample(&mesh, 500);
        assert_eq!(points.len(), 500);
        for p in &points {
            // every point lies on one of the cube faces
            let max = p.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            assert_relative_eq!(max, 1.0, epsilon = 1e-9);
        }
        assert_eq!(points, AreaWeightedSampler::new(3).sample(&mesh, 500));
    }

    #[test]
    fn test_area_weighted_sampler_prefers_large_faces() -> Result<(), MeshError> {
        // a big triangle with area 50 and a small one with area 0.5
        let mesh = TriangleMesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [10.0, 0.0, 0.0],
                [0.0, 10.0, 0.0],
                [0.0, 0.0, 5.0],
                [1.0, 0.0, 5.0],
                [0.0, 1.0, 5.0],
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )?;
        let points = AreaWeightedSampler::new(11).sample(&mesh, 2000);
        let small = points.iter().filter(|p| p[2] > 1.0).count();
        assert!(small < 100, "small face got {small} samples");
        Ok(())
    }

    #[test]
    fn test_sample_surface_points_world_space() -> Result<(), SamplingError> {
        let center = DVec3::new(10.0, 0.0, 0.0);
        let points = sample_surface_points(&cube_at(center), &AreaWeightedSampler::new(0), 100)?;
        assert_eq!(points.len(), 100);
        for p in &points {
            let local = DVec3::from_array(*p) - center;
            assert!(local.abs().max_element() <= 0.5 + 1e-9);
        }
        Ok(())
    }

    struct EmptySampler;

    impl SurfaceSampler for EmptySampler {
        fn sample(&self, _mesh: &TriangleMesh, _count: usize) -> Vec<[f64; 3]> {
            vec![]
        }
    }

    #[test]
    fn test_sample_surface_points_empty() {
        let res = sample_surface_points(&cube_at(DVec3::ZERO), &EmptySampler, 10);
        assert!(matches!(res, Err(SamplingError::EmptySample)));
        assert!(!SamplingError::EmptySample.is_invalid_input());
    }

    struct ShortSampler;

    impl SurfaceSampler for ShortSampler {
        fn sample(&self, _mesh: &TriangleMesh, count: usize) -> Vec<[f64; 3]> {
            vec![[0.0; 3]; count.min(3)]
        }
    }

    #[test]
    fn test_sample_surface_points_short() {
        let res = sample_surface_points(&cube_at(DVec3::ZERO), &ShortSampler, 10);
        assert!(matches!(
            res,
            Err(SamplingError::SampleCountMismatch {
                expected: 10,
                got: 3
            })
        ));
        assert!(res.is_err_and(|e| !e.is_invalid_input()));
    }
}
