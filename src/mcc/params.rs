//! Parameters of the multiscale curvature classification.
//!
//! Defaults follow Evans & Hudak (2007) as adopted by common GIS tooling:
//! three scale domains, a curvature tolerance of 0.3, a convergence threshold
//! of 0.1, tension 2 and a spline step multiplier of 10.

use crate::error::{MccError, Result};
use crate::types::FilterDirection;
use serde::{Deserialize, Serialize};

/// Controller-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MccParams {
    /// Number of scale domains (`nl`, >= 1).
    pub scale_domains: usize,
    /// Base curvature tolerance (`t`, > 0), relaxed by `t/3` per domain.
    pub curvature_tolerance: f64,
    /// Convergence threshold (`j`, > 0) on the outlier/inlier ratio.
    pub convergence_threshold: f64,
    /// Surface tension (`f`, > 0).
    pub tension: f64,
    /// Spline step multiplier (`s`, > 0) applied to the resolution.
    pub spline_steps: f64,
    /// Side of the surface treated as outliers.
    pub direction: FilterDirection,
}

impl Default for MccParams {
    fn default() -> Self {
        Self {
            scale_domains: 3,
            curvature_tolerance: 0.3,
            convergence_threshold: 0.1,
            tension: 2.0,
            spline_steps: 10.0,
            direction: FilterDirection::Positive,
        }
    }
}

impl MccParams {
    /// Reject out-of-range parameters. Each violation names its parameter.
    pub fn validate(&self) -> Result<()> {
        if self.scale_domains < 1 {
            return Err(MccError::invalid(
                "nl",
                "the minimum number of scale domains is 1",
            ));
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold > 0.0) {
            return Err(MccError::invalid(
                "j",
                format!(
                    "the convergence threshold has to be > 0 (got {})",
                    self.convergence_threshold
                ),
            ));
        }
        if !(self.tension.is_finite() && self.tension > 0.0) {
            return Err(MccError::invalid(
                "f",
                format!("the tension parameter has to be > 0 (got {})", self.tension),
            ));
        }
        if !(self.spline_steps.is_finite() && self.spline_steps > 0.0) {
            return Err(MccError::invalid(
                "s",
                format!(
                    "the spline step parameter has to be > 0 (got {})",
                    self.spline_steps
                ),
            ));
        }
        if !(self.curvature_tolerance.is_finite() && self.curvature_tolerance > 0.0) {
            return Err(MccError::invalid(
                "t",
                format!(
                    "the curvature tolerance has to be > 0 (got {})",
                    self.curvature_tolerance
                ),
            ));
        }
        Ok(())
    }
}
