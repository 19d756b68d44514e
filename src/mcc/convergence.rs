//! Per-scale-domain convergence loop.
//!
//! Within one scale domain the outlier filter is applied repeatedly to the
//! shrinking candidate set. After every call the outliers move to the
//! accumulator and the inliers become the next candidate set. The domain
//! converges once `outliers / inliers` drops to the convergence threshold;
//! when no inliers remain the ratio is forced to zero.
//!
//! Every non-final iteration removes at least one point (a positive ratio
//! needs a positive outlier count), so a domain runs at most as many
//! iterations as it has candidates.

use super::accumulator::ClassificationAccumulator;
use super::params::MccParams;
use crate::diagnostics::{elapsed_ms, IterationReport, ScaleDomainReport};
use crate::error::{MccError, Result};
use crate::filter::{FilterRequest, OutlierFilter};
use crate::schedule::ScaleDomainConfig;
use crate::types::{FilterDirection, PointSet};
use log::{debug, info};
use std::time::Instant;

/// Mutable state of one scale domain. Dropped once the domain converges.
#[derive(Debug)]
pub struct ConvergenceState {
    scale: ScaleDomainConfig,
    candidate: PointSet,
    iteration: usize,
    ratio: f64,
}

impl ConvergenceState {
    /// Start a domain. The ratio is unbounded until the first iteration.
    pub fn new(scale: ScaleDomainConfig, candidate: PointSet) -> Self {
        Self {
            scale,
            candidate,
            iteration: 0,
            ratio: f64::INFINITY,
        }
    }

    pub fn scale(&self) -> &ScaleDomainConfig {
        &self.scale
    }

    pub fn candidate(&self) -> &PointSet {
        &self.candidate
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_converged(&self, threshold: f64) -> bool {
        self.ratio <= threshold
    }

    /// Run one filter call on the current candidate set.
    ///
    /// Outliers are appended to `accumulator` (also on the final iteration
    /// that leaves no inliers, so the run-wide count is conserved) and the
    /// inliers replace the candidate set.
    pub fn step<F: OutlierFilter + ?Sized>(
        &mut self,
        filter: &F,
        request: &FilterRequest,
        accumulator: &mut ClassificationAccumulator,
    ) -> Result<IterationReport> {
        let n_input = self.candidate.count();
        let candidate = std::mem::take(&mut self.candidate);
        let partition = filter.classify(candidate, request)?;

        let ng = partition.outliers.count();
        let nc = partition.inliers.count();
        if ng + nc != n_input {
            return Err(MccError::PartitionMismatch {
                expected: n_input,
                outliers: ng,
                inliers: nc,
            });
        }

        self.iteration += 1;
        self.ratio = if nc > 0 { ng as f64 / nc as f64 } else { 0.0 };
        accumulator.append(partition.outliers);
        self.candidate = partition.inliers;

        debug!(
            "scale domain {} iteration {}: input={} non-ground={} unclassified={} ratio={:.3}",
            self.scale.index, self.iteration, n_input, ng, nc, self.ratio
        );

        Ok(IterationReport {
            iteration: self.iteration,
            input_points: n_input,
            outliers: ng,
            inliers: nc,
            ratio: self.ratio,
        })
    }

    pub fn into_candidate(self) -> PointSet {
        self.candidate
    }
}

/// Surviving candidates and the trace of one converged scale domain.
#[derive(Debug)]
pub struct ScaleOutcome {
    pub candidate: PointSet,
    pub report: ScaleDomainReport,
}

/// Drives the outlier filter for one scale domain until convergence.
pub struct ConvergenceLoop<'a, F: OutlierFilter + ?Sized> {
    filter: &'a F,
    threshold: f64,
    tension: f64,
    direction: FilterDirection,
}

impl<'a, F: OutlierFilter + ?Sized> ConvergenceLoop<'a, F> {
    pub fn new(filter: &'a F, params: &MccParams) -> Self {
        Self {
            filter,
            threshold: params.convergence_threshold,
            tension: params.tension,
            direction: params.direction,
        }
    }

    pub fn request(&self, scale: &ScaleDomainConfig) -> FilterRequest {
        FilterRequest {
            resolution: scale.resolution,
            step: scale.step,
            tension: self.tension,
            curvature_tolerance: scale.curvature_tolerance,
            direction: self.direction,
        }
    }

    /// Iterate until convergence. An empty candidate set skips the domain
    /// without calling the filter.
    pub fn run(
        &self,
        scale: ScaleDomainConfig,
        candidate: PointSet,
        accumulator: &mut ClassificationAccumulator,
    ) -> Result<ScaleOutcome> {
        let start = Instant::now();
        let mut report = ScaleDomainReport::new(&scale);

        if candidate.is_empty() {
            info!(
                "scale domain {}/{}: no candidates left, skipping",
                scale.index, scale.scale_domains
            );
            report.skipped = true;
            return Ok(ScaleOutcome { candidate, report });
        }

        info!(
            "processing scale domain {}/{} (res=({:.4}, {:.4}), t={:.4}, {} candidates)",
            scale.index,
            scale.scale_domains,
            scale.resolution.x,
            scale.resolution.y,
            scale.curvature_tolerance,
            candidate.count()
        );

        let request = self.request(&scale);
        let mut state = ConvergenceState::new(scale, candidate);
        while !state.is_converged(self.threshold) {
            let iteration = state.step(self.filter, &request, accumulator)?;
            report.iterations.push(iteration);
        }

        report.elapsed_ms = elapsed_ms(start);
        Ok(ScaleOutcome {
            candidate: state.into_candidate(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Partition;
    use crate::types::{Point, Resolution};
    use std::cell::Cell;

    /// Removes `outliers_per_call[k]` points on call `k` (0 once exhausted).
    struct ScriptedFilter {
        outliers_per_call: Vec<usize>,
        calls: Cell<usize>,
    }

    impl ScriptedFilter {
        fn new(outliers_per_call: Vec<usize>) -> Self {
            Self {
                outliers_per_call,
                calls: Cell::new(0),
            }
        }
    }

    impl OutlierFilter for ScriptedFilter {
        fn classify(&self, points: PointSet, _request: &FilterRequest) -> Result<Partition> {
            let k = self.calls.get();
            self.calls.set(k + 1);
            let ng = self.outliers_per_call.get(k).copied().unwrap_or(0);
            let mut pts = points.into_points();
            let outliers = pts.split_off(pts.len() - ng.min(pts.len()));
            Ok(Partition {
                outliers: PointSet::from_points(outliers),
                inliers: PointSet::from_points(pts),
            })
        }
    }

    struct LossyFilter;

    impl OutlierFilter for LossyFilter {
        fn classify(&self, points: PointSet, _request: &FilterRequest) -> Result<Partition> {
            let mut pts = points.into_points();
            pts.pop();
            Ok(Partition {
                outliers: PointSet::new(),
                inliers: PointSet::from_points(pts),
            })
        }
    }

    struct FailingFilter;

    impl OutlierFilter for FailingFilter {
        fn classify(&self, _points: PointSet, _request: &FilterRequest) -> Result<Partition> {
            Err(MccError::Interpolation("degenerate surface".into()))
        }
    }

    fn cloud(n: usize) -> PointSet {
        (0..n).map(|i| Point::new(i as f64, 0.0, 0.0)).collect()
    }

    fn scale() -> ScaleDomainConfig {
        ScaleDomainConfig {
            index: 1,
            scale_domains: 1,
            resolution: Resolution::uniform(1.0),
            step: Resolution::uniform(10.0),
            curvature_tolerance: 0.3,
        }
    }

    #[test]
    fn iterates_until_ratio_reaches_threshold() {
        // 100 -> 80 (20/80 = 0.25) -> 75 (5/75 = 0.067 <= 0.1)
        let filter = ScriptedFilter::new(vec![20, 5]);
        let looper = ConvergenceLoop::new(&filter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let out = looper.run(scale(), cloud(100), &mut acc).unwrap();

        assert_eq!(filter.calls.get(), 2);
        assert_eq!(out.candidate.count(), 75);
        assert_eq!(acc.count(), 25);
        assert_eq!(out.report.iterations.len(), 2);
        for it in &out.report.iterations {
            assert_eq!(it.outliers + it.inliers, it.input_points);
        }
        assert!(out.report.iterations[0].ratio > 0.1);
        assert!(out.report.iterations[1].ratio <= 0.1);
    }

    #[test]
    fn ratio_may_exceed_one() {
        let filter = ScriptedFilter::new(vec![60, 0]);
        let looper = ConvergenceLoop::new(&filter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let out = looper.run(scale(), cloud(100), &mut acc).unwrap();
        assert_eq!(out.report.iterations[0].ratio, 1.5);
        assert_eq!(out.report.iterations[1].ratio, 0.0);
        assert_eq!(out.candidate.count(), 40);
    }

    #[test]
    fn no_inliers_forces_convergence_and_keeps_outliers() {
        let filter = ScriptedFilter::new(vec![10]);
        let looper = ConvergenceLoop::new(&filter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let out = looper.run(scale(), cloud(10), &mut acc).unwrap();

        assert_eq!(filter.calls.get(), 1);
        assert_eq!(out.report.iterations[0].ratio, 0.0);
        assert!(out.candidate.is_empty());
        assert_eq!(acc.count(), 10);
    }

    #[test]
    fn empty_candidate_skips_filter() {
        let filter = ScriptedFilter::new(vec![]);
        let looper = ConvergenceLoop::new(&filter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let out = looper.run(scale(), PointSet::new(), &mut acc).unwrap();
        assert_eq!(filter.calls.get(), 0);
        assert!(out.report.skipped);
        assert!(out.report.iterations.is_empty());
    }

    #[test]
    fn lost_points_are_a_partition_mismatch() {
        let looper = ConvergenceLoop::new(&LossyFilter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let err = looper.run(scale(), cloud(5), &mut acc).unwrap_err();
        assert!(matches!(
            err,
            MccError::PartitionMismatch {
                expected: 5,
                outliers: 0,
                inliers: 4
            }
        ));
    }

    #[test]
    fn filter_errors_propagate() {
        let looper = ConvergenceLoop::new(&FailingFilter, &MccParams::default());
        let mut acc = ClassificationAccumulator::new();
        let err = looper.run(scale(), cloud(5), &mut acc).unwrap_err();
        assert!(matches!(err, MccError::Interpolation(_)));
        assert_eq!(acc.count(), 0);
    }

    #[test]
    fn state_tracks_iterations() {
        let filter = ScriptedFilter::new(vec![3]);
        let looper = ConvergenceLoop::new(&filter, &MccParams::default());
        let request = looper.request(&scale());
        let mut state = ConvergenceState::new(scale(), cloud(12));
        let mut acc = ClassificationAccumulator::new();
        assert!(!state.is_converged(0.1));

        let it = state.step(&filter, &request, &mut acc).unwrap();
        assert_eq!(state.iteration(), 1);
        assert_eq!(it.ratio, 3.0 / 9.0);
        assert_eq!(state.candidate().count(), 9);
        assert_eq!(state.scale().index, 1);
        assert!(!state.is_converged(0.1));
    }
}
