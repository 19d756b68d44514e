use crate::schedule::ScaleDomainConfig;
use crate::types::Resolution;
use serde::Serialize;

/// Counts observed in one convergence iteration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationReport {
    /// 1-based iteration number within the scale domain.
    pub iteration: usize,
    /// Candidate points handed to the outlier filter.
    pub input_points: usize,
    /// Points classified as non-ground in this iteration.
    pub outliers: usize,
    /// Points still unclassified after this iteration.
    pub inliers: usize,
    /// `outliers / inliers`, forced to 0 once no inliers remain.
    pub ratio: f64,
}

/// Trace of one scale domain.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleDomainReport {
    pub index: usize,
    pub resolution: Resolution,
    pub step: Resolution,
    pub curvature_tolerance: f64,
    /// True when the domain started without candidates and was not run.
    pub skipped: bool,
    pub iterations: Vec<IterationReport>,
    pub elapsed_ms: f64,
}

impl ScaleDomainReport {
    pub fn new(scale: &ScaleDomainConfig) -> Self {
        Self {
            index: scale.index,
            resolution: scale.resolution,
            step: scale.step,
            curvature_tolerance: scale.curvature_tolerance,
            skipped: false,
            iterations: Vec::new(),
            elapsed_ms: 0.0,
        }
    }

    /// Non-ground points found in this domain.
    pub fn outliers(&self) -> usize {
        self.iterations.iter().map(|it| it.outliers).sum()
    }

    /// Candidates left when the domain converged.
    pub fn remaining(&self) -> Option<usize> {
        self.iterations.last().map(|it| it.inliers)
    }

    pub fn final_ratio(&self) -> Option<f64> {
        self.iterations.last().map(|it| it.ratio)
    }
}
