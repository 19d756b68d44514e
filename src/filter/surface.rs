//! Regularised local-plane surface used as the bundled outlier filter.
//!
//! For every point the filter gathers its planimetric neighbours within half
//! the spline-step diagonal (never less than one grid cell), fits a weighted
//! plane `z = a + b·u + c·v` to them and compares the point's elevation with
//! the plane at its own position. `u`, `v` are offsets normalised by the
//! search radius; weights are Gaussian in the normalised distance.
//!
//! The slope terms carry a Tikhonov penalty equal to the tension, which makes
//! the 3×3 normal matrix positive definite whenever the tension is positive.
//! Higher tension yields a stiffer (flatter) surface. The point under test is
//! left out of its own fit so that isolated spikes cannot pull the surface
//! towards themselves.
//!
//! Neighbour lookup uses an R-tree; per-point fits run in parallel.

use super::{FilterRequest, OutlierFilter, Partition};
use crate::error::{MccError, Result};
use crate::types::{Point, PointSet};
use log::debug;
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::Deserialize;

/// Options of the bundled surface filter.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceOptions {
    /// Minimum number of points required to fit a surface at all.
    pub min_points: usize,
    /// Closest neighbours used per fit; `0` keeps every point in the radius.
    pub max_neighbours: usize,
    /// Evaluate points on the rayon pool.
    pub parallel: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            min_points: 3,
            max_neighbours: 256,
            parallel: true,
        }
    }
}

/// Outlier filter fitting a regularised local plane around every point.
#[derive(Clone, Debug, Default)]
pub struct SurfaceOutlierFilter {
    options: SurfaceOptions,
}

impl SurfaceOutlierFilter {
    pub fn new(options: SurfaceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    /// Signed residual (observed minus fitted) of every point, in input order.
    pub fn residuals(&self, points: &PointSet, request: &FilterRequest) -> Result<Vec<f64>> {
        let n = points.count();
        let min_points = self.options.min_points.max(1);
        if n < min_points {
            return Err(MccError::Interpolation(format!(
                "{n} points are too few to fit a surface (need at least {min_points})"
            )));
        }
        if !(request.tension.is_finite() && request.tension > 0.0) {
            return Err(MccError::invalid(
                "f",
                format!("the tension parameter has to be > 0 (got {})", request.tension),
            ));
        }

        let radius = search_radius(request);
        let tree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(index, p)| IndexedPoint { index, xy: p.xy() })
                .collect(),
        );
        let ctx = FitContext {
            tree: &tree,
            points: points.points(),
            radius,
            tension: request.tension,
            max_neighbours: self.options.max_neighbours,
        };

        if self.options.parallel {
            (0..n).into_par_iter().map(|i| ctx.residual(i)).collect()
        } else {
            (0..n).map(|i| ctx.residual(i)).collect()
        }
    }
}

impl OutlierFilter for SurfaceOutlierFilter {
    fn classify(&self, points: PointSet, request: &FilterRequest) -> Result<Partition> {
        let residuals = self.residuals(&points, request)?;
        let mut partition = Partition {
            outliers: PointSet::new(),
            inliers: PointSet::with_capacity(points.count()),
        };
        for (point, residual) in points.into_iter().zip(residuals) {
            if request
                .direction
                .is_outlier(residual, request.curvature_tolerance)
            {
                partition.outliers.push(point);
            } else {
                partition.inliers.push(point);
            }
        }
        debug!(
            "surface filter: step=({:.3}, {:.3}) t={:.3} {} -> outliers={} inliers={}",
            request.step.x,
            request.step.y,
            request.curvature_tolerance,
            request.direction,
            partition.outliers.count(),
            partition.inliers.count()
        );
        Ok(partition)
    }
}

fn search_radius(request: &FilterRequest) -> f64 {
    let half_diag = 0.5 * request.step.x.hypot(request.step.y);
    let cell = request.resolution.x.max(request.resolution.y);
    half_diag.max(cell)
}

struct IndexedPoint {
    index: usize,
    xy: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xy)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.xy[0] - point[0];
        let dy = self.xy[1] - point[1];
        dx * dx + dy * dy
    }
}

struct FitContext<'a> {
    tree: &'a RTree<IndexedPoint>,
    points: &'a [Point],
    radius: f64,
    tension: f64,
    max_neighbours: usize,
}

impl FitContext<'_> {
    fn residual(&self, i: usize) -> Result<f64> {
        let p = self.points[i];
        let mut neighbours: Vec<(f64, usize)> = self
            .tree
            .locate_within_distance(p.xy(), self.radius * self.radius)
            .filter(|q| q.index != i)
            .map(|q| (q.distance_2(&p.xy()), q.index))
            .collect();
        if neighbours.is_empty() {
            return Ok(0.0);
        }
        if self.max_neighbours > 0 && neighbours.len() > self.max_neighbours {
            neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));
            neighbours.truncate(self.max_neighbours);
        }

        // Elevations relative to the query point keep the system well scaled.
        let mut ata = Matrix3::<f64>::zeros();
        let mut atb = Vector3::<f64>::zeros();
        for &(d2, j) in &neighbours {
            let q = self.points[j];
            let u = (q.x - p.x) / self.radius;
            let v = (q.y - p.y) / self.radius;
            let w = (-2.0 * d2 / (self.radius * self.radius)).exp();
            let row = Vector3::new(1.0, u, v);
            ata += w * row * row.transpose();
            atb += w * (q.z - p.z) * row;
        }
        ata[(1, 1)] += self.tension;
        ata[(2, 2)] += self.tension;

        let coeffs = ata
            .cholesky()
            .map(|c| c.solve(&atb))
            .ok_or_else(|| {
                MccError::Interpolation(format!(
                    "singular normal matrix at ({:.3}, {:.3})",
                    p.x, p.y
                ))
            })?;
        let residual = -coeffs[0];
        if !residual.is_finite() {
            return Err(MccError::Interpolation(format!(
                "non-finite residual at ({:.3}, {:.3})",
                p.x, p.y
            )));
        }
        Ok(residual)
    }
}
