#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod mcc;
pub mod schedule;
pub mod types;

// Collaborators and tooling around the controller.
pub mod config;
pub mod filter;
pub mod store;
pub mod synthetic;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{MccError, Result};
pub use crate::mcc::{Classification, MccParams, MultiscaleClassifier, RunRequest};
pub use crate::schedule::{ScaleDomainConfig, ScaleSchedule};
pub use crate::types::{FilterDirection, Point, PointSet, Resolution};

pub use crate::diagnostics::ClassificationReport;
pub use crate::filter::{OutlierFilter, Partition};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use lidar_mcc::prelude::*;
///
/// # fn main() -> lidar_mcc::Result<()> {
/// let cloud: PointSet = (0..100)
///     .map(|i| Point::new((i % 10) as f64, (i / 10) as f64, 0.0))
///     .collect();
/// let mcc = MultiscaleClassifier::new(MccParams::default(), SurfaceOutlierFilter::default())?;
/// let result = mcc.classify(cloud, Resolution::uniform(1.0))?;
/// println!("ground={} non-ground={}", result.ground.count(), result.nonground.count());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::filter::SurfaceOutlierFilter;
    pub use crate::store::{DirectoryStore, MemoryStore, PointStore, Region};
    pub use crate::{
        FilterDirection, MccParams, MultiscaleClassifier, Point, PointSet, Resolution, RunRequest,
    };
}
