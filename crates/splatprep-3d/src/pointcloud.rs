use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How sampled points are colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointColor {
    /// Every point is white.
    #[default]
    White,
    /// Every point gets a seeded random color.
    Random,
}

/// A point cloud with points and colors.
#[derive(Debug, Clone)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points and colors (optional).
    pub fn new(points: Vec<[f64; 3]>, colors: Option<Vec<[u8; 3]>>) -> Self {
        Self { points, colors }
    }

    /// Create a point cloud and assign colors following `mode`.
    ///
    /// The same `seed` always yields the same random colors.
    pub fn with_point_color(points: Vec<[f64; 3]>, mode: PointColor, seed: u64) -> Self {
        let colors = match mode {
            PointColor::White => vec![[255, 255, 255]; points.len()],
            PointColor::Random => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..points.len())
                    .map(|_| [rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()])
                    .collect()
            }
        };
        Self::new(points, Some(colors))
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &Vec<[f64; 3]> {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&Vec<[u8; 3]>> {
        self.colors.as_ref()
    }

    /// Color of a point, white when the cloud carries no colors.
    pub fn color(&self, index: usize) -> [u8; 3] {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or([255, 255, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(
            vec![[0.0, 0.0, 0.0], [1.0, -2.0, 0.0]],
            Some(vec![[255, 0, 0], [0, 255, 0]]),
        );

        assert_eq!(pointcloud.len(), 2);
        assert!(!pointcloud.is_empty());
        assert_eq!(pointcloud.color(1), [0, 255, 0]);
    }

    #[test]
    fn test_point_color_modes() {
        let points = vec![[0.0; 3]; 16];
        let white = PointCloud::with_point_color(points.clone(), PointColor::White, 0);
        assert!(white.colors().is_some_and(|c| c.iter().all(|&c| c == [255; 3])));

        let a = PointCloud::with_point_color(points.clone(), PointColor::Random, 7);
        let b = PointCloud::with_point_color(points, PointColor::Random, 7);
        assert_eq!(a.colors(), b.colors());
        assert!(a.colors().is_some_and(|c| c.iter().any(|&c| c != [255; 3])));
    }

    #[test]
    fn test_empty_pointcloud() {
        let pointcloud = PointCloud::new(vec![], None);
        assert!(pointcloud.is_empty());
        assert_eq!(pointcloud.color(0), [255, 255, 255]);
    }
}
