//! Serializable diagnostics produced by a classification run.
//!
//! [`ClassificationReport`] is the entry point: it records the input, one
//! [`ScaleDomainReport`] per scale domain with the per-iteration counts, the
//! final ground / non-ground sizes and a [`TimingBreakdown`]. Reports are
//! plain data and can be written as JSON with
//! [`write_json_file`](crate::store::io::write_json_file).

pub mod report;
pub mod scale;
pub mod timing;

pub use report::{ClassificationReport, InputDescriptor};
pub use scale::{IterationReport, ScaleDomainReport};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
