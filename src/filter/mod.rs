//! Outlier filter seam: fit a surface to a point set and split it into
//! outliers and inliers.
//!
//! The multiscale controller only relies on the [`OutlierFilter`] contract:
//! every input point ends up in exactly one side of the returned
//! [`Partition`]. [`SurfaceOutlierFilter`] is the bundled implementation; any
//! other interpolant (splines, TIN, raster DEM) can be plugged in.

pub mod surface;

use crate::error::Result;
use crate::types::{FilterDirection, PointSet, Resolution};
use serde::Serialize;

pub use surface::{SurfaceOptions, SurfaceOutlierFilter};

/// Per-call parameters handed to the outlier filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub resolution: Resolution,
    pub step: Resolution,
    pub tension: f64,
    pub curvature_tolerance: f64,
    pub direction: FilterDirection,
}

/// Outcome of one filter call. `outliers.count() + inliers.count()` equals
/// the input count.
#[derive(Debug, Default)]
pub struct Partition {
    pub outliers: PointSet,
    pub inliers: PointSet,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.outliers.count() + self.inliers.count()
    }
}

/// Surface-fitting outlier detection consumed by the convergence loop.
///
/// Implementations take ownership of `points` and must hand every point back
/// in the returned partition. A surface that cannot be fitted is reported as
/// [`MccError::Interpolation`](crate::MccError::Interpolation).
pub trait OutlierFilter {
    fn classify(&self, points: PointSet, request: &FilterRequest) -> Result<Partition>;
}

impl<F: OutlierFilter + ?Sized> OutlierFilter for &F {
    fn classify(&self, points: PointSet, request: &FilterRequest) -> Result<Partition> {
        (**self).classify(points, request)
    }
}

impl<F: OutlierFilter + ?Sized> OutlierFilter for Box<F> {
    fn classify(&self, points: PointSet, request: &FilterRequest) -> Result<Partition> {
        (**self).classify(points, request)
    }
}
