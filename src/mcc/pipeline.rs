//! Orchestrator driving the scale domains end-to-end.
//!
//! [`MultiscaleClassifier`] validates its parameters when constructed, then
//! for every run builds the full scale schedule (rejecting a non-positive
//! base resolution before any filter call), seeds the first domain with the
//! input and every later domain with the survivors of the previous one, and
//! finally returns the survivors as ground and the accumulated outliers as
//! non-ground.
//!
//! Typical usage:
//! ```no_run
//! use lidar_mcc::{MccParams, MultiscaleClassifier, PointSet, Resolution};
//! use lidar_mcc::filter::SurfaceOutlierFilter;
//!
//! # fn example(cloud: PointSet) -> lidar_mcc::Result<()> {
//! let mcc = MultiscaleClassifier::new(MccParams::default(), SurfaceOutlierFilter::default())?;
//! let result = mcc.classify(cloud, Resolution::uniform(1.5))?;
//! println!("ground={} non-ground={}", result.ground.count(), result.nonground.count());
//! # Ok(())
//! # }
//! ```
use super::accumulator::ClassificationAccumulator;
use super::convergence::{ConvergenceLoop, ScaleOutcome};
use super::params::MccParams;
use crate::diagnostics::{elapsed_ms, ClassificationReport, InputDescriptor, TimingBreakdown};
use crate::error::{MccError, Result};
use crate::filter::OutlierFilter;
use crate::schedule::ScaleSchedule;
use crate::store::PointStore;
use crate::types::{PointSet, Resolution};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Ground / non-ground split of one run.
#[derive(Debug)]
pub struct Classification {
    pub ground: PointSet,
    pub nonground: PointSet,
    pub report: ClassificationReport,
}

/// Collection names for a store-backed run.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub input: String,
    pub ground_output: String,
    pub nonground_output: String,
    /// Replace existing output collections.
    pub overwrite: bool,
}

impl RunRequest {
    pub fn new(
        input: impl Into<String>,
        ground_output: impl Into<String>,
        nonground_output: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            ground_output: ground_output.into(),
            nonground_output: nonground_output.into(),
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Multiscale curvature classification over a pluggable outlier filter.
pub struct MultiscaleClassifier<F> {
    params: MccParams,
    filter: F,
}

impl<F: OutlierFilter> MultiscaleClassifier<F> {
    /// Create a classifier; fails on the first out-of-range parameter.
    pub fn new(params: MccParams, filter: F) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, filter })
    }

    pub fn params(&self) -> &MccParams {
        &self.params
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Classify an in-memory point set given the base grid resolution.
    pub fn classify(&self, input: PointSet, base: Resolution) -> Result<Classification> {
        if input.is_empty() {
            return Err(MccError::EmptyInput("input".to_string()));
        }
        let schedule = ScaleSchedule::new(
            self.params.scale_domains,
            base,
            self.params.curvature_tolerance,
            self.params.spline_steps,
        )?;

        let total_start = Instant::now();
        let n_input = input.count();
        debug!(
            "MultiscaleClassifier::classify start points={} domains={} base=({:.4}, {:.4})",
            n_input,
            schedule.len(),
            base.x,
            base.y
        );

        let looper = ConvergenceLoop::new(&self.filter, &self.params);
        let mut accumulator = ClassificationAccumulator::new();
        let mut timings = TimingBreakdown::default();
        let mut scales = Vec::with_capacity(schedule.len());
        let mut candidate = input;

        for scale in schedule.iter() {
            let before = candidate.count();
            let ScaleOutcome {
                candidate: survivors,
                report,
            } = looper.run(*scale, candidate, &mut accumulator)?;
            debug_assert!(survivors.count() <= before);
            debug_assert_eq!(survivors.count() + accumulator.count(), n_input);
            timings.push(format!("scale domain {}", scale.index), report.elapsed_ms);
            scales.push(report);
            candidate = survivors;
        }

        let ground = candidate;
        let nonground = accumulator.finalize();
        timings.total_ms = elapsed_ms(total_start);
        info!(
            "classified {} points: ground={} non-ground={} ({:.1} ms)",
            n_input,
            ground.count(),
            nonground.count(),
            timings.total_ms
        );

        let report = ClassificationReport {
            input: InputDescriptor {
                name: None,
                points: n_input,
                base_resolution: base,
                params: self.params.clone(),
            },
            scales,
            ground_points: ground.count(),
            nonground_points: nonground.count(),
            timings,
        };
        Ok(Classification {
            ground,
            nonground,
            report,
        })
    }

    /// Classify collection `request.input` of `store` and write both outputs.
    ///
    /// All checks (existence, emptiness, output names, region) happen before
    /// the input is classified. Both outputs are first written under staging
    /// names and only renamed into place once both writes succeeded; on
    /// failure the staged collections are removed and existing collections
    /// are left untouched.
    pub fn run<S: PointStore + ?Sized>(
        &self,
        store: &mut S,
        request: &RunRequest,
    ) -> Result<ClassificationReport> {
        let input = request.input.as_str();
        if !store.exists(input) {
            return Err(MccError::NotFound(input.to_string()));
        }
        let io_start = Instant::now();
        let points = store.load(input)?;
        if points.is_empty() {
            return Err(MccError::EmptyInput(input.to_string()));
        }
        check_output_names(store, request)?;
        let base = store.region(input)?.resolution();
        let load_ms = elapsed_ms(io_start);

        let Classification {
            ground,
            nonground,
            mut report,
        } = self.classify(points, base)?;
        report.input.name = Some(input.to_string());

        let write_start = Instant::now();
        let mut guard = OutputGuard::new(store);
        guard.stage(&request.ground_output, ground)?;
        guard.stage(&request.nonground_output, nonground)?;
        guard.commit(request.overwrite)?;

        report.timings.push("load", load_ms);
        report.timings.record("write", write_start);
        Ok(report)
    }
}

fn check_output_names<S: PointStore + ?Sized>(store: &S, request: &RunRequest) -> Result<()> {
    store.validate_name(&request.ground_output)?;
    store.validate_name(&request.nonground_output)?;
    if request.ground_output == request.nonground_output {
        return Err(MccError::invalid(
            "ng_output",
            "ground and non-ground outputs must differ",
        ));
    }
    for output in [&request.ground_output, &request.nonground_output] {
        if *output == request.input {
            return Err(MccError::invalid(
                "g_output",
                format!("output <{output}> would replace the input"),
            ));
        }
        if !request.overwrite && store.exists(output) {
            return Err(MccError::OutputExists(output.clone()));
        }
    }
    Ok(())
}

static STAGING_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Staging name for `output`, unique per process and run.
fn staging_name(output: &str) -> String {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{output}.mcc_{}_{seq}", std::process::id())
}

/// Writes outputs under staging names and moves them into place on
/// [`commit`](OutputGuard::commit). Staged collections still present when
/// the guard is dropped are removed.
struct OutputGuard<'s, S: PointStore + ?Sized> {
    store: &'s mut S,
    /// `(staging, final)` name pairs.
    staged: Vec<(String, String)>,
}

impl<'s, S: PointStore + ?Sized> OutputGuard<'s, S> {
    fn new(store: &'s mut S) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    fn stage(&mut self, output: &str, points: PointSet) -> Result<()> {
        let staging = staging_name(output);
        self.store.write(&staging, points, true)?;
        self.staged.push((staging, output.to_string()));
        Ok(())
    }

    fn commit(mut self, overwrite: bool) -> Result<()> {
        while let Some((staging, output)) = self.staged.first().cloned() {
            self.store.rename(&staging, &output, overwrite)?;
            self.staged.remove(0);
        }
        Ok(())
    }
}

impl<S: PointStore + ?Sized> Drop for OutputGuard<'_, S> {
    fn drop(&mut self) {
        for (staging, _) in self.staged.drain(..) {
            if let Err(err) = self.store.remove(&staging) {
                warn!("failed to remove staged output <{staging}>: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterRequest, Partition};
    use crate::store::{MemoryStore, Region};
    use crate::types::Point;
    use std::cell::{Cell, RefCell};

    /// Flags every point with `z` above the tolerance; records each request.
    #[derive(Default)]
    struct HeightFilter {
        requests: RefCell<Vec<FilterRequest>>,
    }

    impl OutlierFilter for HeightFilter {
        fn classify(&self, points: PointSet, request: &FilterRequest) -> Result<Partition> {
            self.requests.borrow_mut().push(*request);
            let mut part = Partition::default();
            for p in points {
                if request.direction.is_outlier(p.z, request.curvature_tolerance) {
                    part.outliers.push(p);
                } else {
                    part.inliers.push(p);
                }
            }
            Ok(part)
        }
    }

    struct CountingFilter {
        calls: Cell<usize>,
    }

    impl OutlierFilter for CountingFilter {
        fn classify(&self, points: PointSet, _request: &FilterRequest) -> Result<Partition> {
            self.calls.set(self.calls.get() + 1);
            Ok(Partition {
                outliers: PointSet::new(),
                inliers: points,
            })
        }
    }

    fn cloud() -> PointSet {
        // z = 0.0, 0.1, ..., 0.9 at x = 0..10
        (0..10)
            .map(|i| Point::new(i as f64, 0.0, i as f64 / 10.0))
            .collect()
    }

    #[test]
    fn scale_domains_escalate_tolerance_and_hand_over_survivors() {
        let params = MccParams {
            scale_domains: 3,
            ..MccParams::default()
        };
        let mcc = MultiscaleClassifier::new(params, HeightFilter::default()).unwrap();
        let result = mcc.classify(cloud(), Resolution::uniform(2.0)).unwrap();

        // t = 0.3 removes z >= 0.4; the relaxed tolerances find nothing new.
        assert_eq!(result.nonground.count(), 6);
        assert_eq!(result.ground.count(), 4);
        assert!(result.report.is_conserved());
        assert_eq!(result.report.scales.len(), 3);

        let requests = mcc.filter().requests.borrow();
        let tolerances: Vec<f64> = requests.iter().map(|r| r.curvature_tolerance).collect();
        assert_eq!(requests.len(), 4);
        assert!((tolerances[0] - 0.3).abs() < 1e-12);
        assert!((tolerances[1] - 0.3).abs() < 1e-12);
        assert!((tolerances[2] - 0.4).abs() < 1e-12);
        assert!((tolerances[3] - 0.5).abs() < 1e-12);
        assert_eq!(requests[0].resolution, Resolution::uniform(1.0));
        assert_eq!(requests[2].resolution, Resolution::uniform(2.0));
        assert_eq!(requests[3].step, Resolution::uniform(40.0));
    }

    #[test]
    fn invalid_parameters_fail_at_construction() {
        let err = MultiscaleClassifier::new(
            MccParams {
                convergence_threshold: -0.5,
                ..MccParams::default()
            },
            HeightFilter::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MccError::InvalidParameter { name: "j", .. }));
    }

    #[test]
    fn bad_resolution_fails_before_filtering() {
        let filter = CountingFilter { calls: Cell::new(0) };
        let mcc = MultiscaleClassifier::new(MccParams::default(), &filter).unwrap();
        let err = mcc.classify(cloud(), Resolution::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            MccError::InvalidParameter { name: "resolution", .. }
        ));
        assert_eq!(filter.calls.get(), 0);
    }

    #[test]
    fn run_reports_missing_empty_and_clashing_collections() {
        let mcc = MultiscaleClassifier::new(MccParams::default(), HeightFilter::default()).unwrap();
        let mut store = MemoryStore::new().with_region(Region::new(1.0, 1.0));
        store.insert("empty", PointSet::new());
        store.insert("cloud", cloud());
        store.insert("taken", PointSet::new());

        let req = RunRequest::new("nope", "g", "ng");
        assert!(matches!(mcc.run(&mut store, &req), Err(MccError::NotFound(_))));

        let req = RunRequest::new("empty", "g", "ng");
        assert!(matches!(mcc.run(&mut store, &req), Err(MccError::EmptyInput(_))));

        let req = RunRequest::new("cloud", "taken", "ng");
        assert!(matches!(mcc.run(&mut store, &req), Err(MccError::OutputExists(_))));

        let req = RunRequest::new("cloud", "same", "same");
        assert!(matches!(
            mcc.run(&mut store, &req),
            Err(MccError::InvalidParameter { .. })
        ));
        assert!(mcc.filter().requests.borrow().is_empty());

        let req = RunRequest::new("cloud", "taken", "ng").with_overwrite(true);
        let report = mcc.run(&mut store, &req).unwrap();
        assert_eq!(report.input.name.as_deref(), Some("cloud"));
        assert_eq!(store.count("taken").unwrap() + store.count("ng").unwrap(), 10);
    }
}
