//! Core value types shared by the scheduler, the convergence loop and the
//! collaborators.
//!
//! [`PointSet`] is not `Clone`; a set is owned by exactly one
//! stage at a time and moves from "candidate" to "non-ground" or "ground".

use serde::{Deserialize, Serialize};

/// A single return with planimetric coordinates and elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Owned collection of points with a known cardinality.
#[derive(Debug, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Number of points in the set.
    #[inline]
    pub fn count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Merge `other` into `self`, consuming it.
    pub fn append(&mut self, other: PointSet) {
        let mut other = other.points;
        self.points.append(&mut other);
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Axis-aligned planimetric bounds as `([min_x, min_y], [max_x, max_y])`.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = self.points.first()?;
        let mut min = first.xy();
        let mut max = first.xy();
        for p in &self.points[1..] {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        }
        Some((min, max))
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PointSet {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Grid cell size along east-west (`x`) and north-south (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(res: f64) -> Self {
        Self { x: res, y: res }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

/// Which side of the fitted surface counts as an outlier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDirection {
    /// Points above the surface (vegetation, buildings).
    #[default]
    Positive,
    /// Points below the surface (multipath, pits).
    Negative,
}

impl FilterDirection {
    /// True when `residual` (observed minus fitted) exceeds `tolerance` on
    /// this side of the surface.
    #[inline]
    pub fn is_outlier(self, residual: f64, tolerance: f64) -> bool {
        match self {
            FilterDirection::Positive => residual > tolerance,
            FilterDirection::Negative => residual < -tolerance,
        }
    }
}

impl std::fmt::Display for FilterDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterDirection::Positive => f.write_str("positive"),
            FilterDirection::Negative => f.write_str("negative"),
        }
    }
}
