//! Multiscale curvature classification controller.
//!
//! Overview
//! - [`ScaleSchedule`](crate::schedule::ScaleSchedule) fixes resolution and
//!   curvature tolerance for every scale domain up front.
//! - For each domain the [`ConvergenceLoop`] applies the outlier filter to
//!   the candidate set until the ratio of new outliers to remaining
//!   candidates reaches the convergence threshold.
//! - Outliers are merged into the [`ClassificationAccumulator`]; the
//!   candidates left after the last domain are the ground points.
//!
//! Modules
//! - [`params`] – run parameters and their validation.
//! - [`accumulator`] – running non-ground collection.
//! - [`convergence`] – per-domain iteration state and loop.
//! - [`pipeline`] – the [`MultiscaleClassifier`] orchestrator.
//!
//! Invariants
//! - Every filter call partitions its input; a mismatch aborts the run.
//! - The candidate count never grows, across iterations or domains.
//! - `ground + non-ground == input` at the end of every successful run.

pub mod accumulator;
pub mod convergence;
pub mod params;
pub mod pipeline;

pub use accumulator::ClassificationAccumulator;
pub use convergence::{ConvergenceLoop, ConvergenceState, ScaleOutcome};
pub use params::MccParams;
pub use pipeline::{Classification, MultiscaleClassifier, RunRequest};
