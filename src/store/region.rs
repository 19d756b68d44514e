//! Base grid resolution of the working area.

use crate::error::{MccError, Result};
use crate::types::{PointSet, Resolution};
use serde::{Deserialize, Serialize};

/// Cell size of the working region (east-west and north-south).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub ewres: f64,
    pub nsres: f64,
}

impl Region {
    pub fn new(ewres: f64, nsres: f64) -> Self {
        Self { ewres, nsres }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.ewres, self.nsres)
    }

    /// Derive a square cell size from the extent and density of `points`:
    /// `sqrt(area / n)` for areal clouds, `length / (n - 1)` for collinear
    /// ones.
    pub fn estimate(points: &PointSet) -> Result<Self> {
        let n = points.count();
        let degenerate = || {
            MccError::invalid(
                "resolution",
                format!("cannot derive a resolution from {n} point(s) without extent"),
            )
        };
        let (min, max) = points.bounds().ok_or_else(degenerate)?;
        let width = max[0] - min[0];
        let height = max[1] - min[1];
        let area = width * height;
        let res = if area > 0.0 {
            (area / n as f64).sqrt()
        } else if n > 1 {
            width.max(height) / (n - 1) as f64
        } else {
            0.0
        };
        if !(res.is_finite() && res > 0.0) {
            return Err(degenerate());
        }
        Ok(Self::new(res, res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use approx::assert_relative_eq;

    #[test]
    fn estimate_uses_mean_point_spacing() {
        // 11 x 11 lattice on a 10 x 10 extent
        let pts: PointSet = (0..121)
            .map(|i| Point::new((i % 11) as f64, (i / 11) as f64, 0.0))
            .collect();
        let region = Region::estimate(&pts).unwrap();
        assert_relative_eq!(region.ewres, (100.0f64 / 121.0).sqrt());
        assert_eq!(region.ewres, region.nsres);
    }

    #[test]
    fn collinear_points_use_line_spacing() {
        let pts: PointSet = (0..5).map(|i| Point::new(2.0 * i as f64, 1.0, 0.0)).collect();
        let region = Region::estimate(&pts).unwrap();
        assert_relative_eq!(region.ewres, 2.0);
    }

    #[test]
    fn single_point_has_no_resolution() {
        let pts = PointSet::from_points(vec![Point::new(1.0, 1.0, 1.0)]);
        assert!(matches!(
            Region::estimate(&pts),
            Err(MccError::InvalidParameter { name: "resolution", .. })
        ));
    }
}
