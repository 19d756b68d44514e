//! Scale-domain schedule: grid resolution and curvature tolerance per pass.
//!
//! Resolutions follow a triangular schedule around the base (native) cell
//! size. With `mid = (nl + 1) / 2`, domains before `mid` divide the base
//! resolution by `mid - l + 1`, domain `mid` uses it unchanged and domains
//! after `mid` multiply it by `l + 1 - mid`. For `nl = 5` and base `r` this
//! yields `r/3, r/2, r, 2r, 3r`.
//!
//! The curvature tolerance grows by a third of the base tolerance per domain,
//! `t(l) = t0 + (l - 1) * t0 / 3`.
//!
//! Everything here is pure; the schedule is computed once and validated
//! before any point is touched.

use crate::error::{MccError, Result};
use crate::types::Resolution;
use serde::Serialize;

/// Parameters of a single scale domain. Immutable once computed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleDomainConfig {
    /// 1-based scale domain index.
    pub index: usize,
    /// Total number of domains in the schedule.
    pub scale_domains: usize,
    /// Grid resolution of the interpolated surface.
    pub resolution: Resolution,
    /// Spline step (neighbourhood width) passed to the outlier filter.
    pub step: Resolution,
    /// Maximum residual before a point is flagged as an outlier.
    pub curvature_tolerance: f64,
}

/// Resolution multiplier applied to the base resolution for domain `l`.
pub fn resolution_factor(l: usize, nl: usize) -> f64 {
    let mid = (nl + 1) / 2;
    if l < mid {
        1.0 / (mid - l + 1) as f64
    } else if l == mid {
        1.0
    } else {
        (l + 1 - mid) as f64
    }
}

/// Curvature tolerance for domain `l` given the base tolerance `t0`.
/// Index 0 is treated like the first domain.
pub fn curvature_tolerance(l: usize, t0: f64) -> f64 {
    t0 + l.saturating_sub(1) as f64 * (t0 / 3.0)
}

/// Compute the configuration of scale domain `l` (1-based) out of `nl`.
pub fn scale_domain(
    l: usize,
    nl: usize,
    base: Resolution,
    t0: f64,
    spline_steps: f64,
) -> Result<ScaleDomainConfig> {
    check_schedule_inputs(nl, base, t0, spline_steps)?;
    if l == 0 || l > nl {
        return Err(MccError::invalid(
            "l",
            format!("scale domain index {l} outside 1..={nl}"),
        ));
    }
    let resolution = base.scaled(resolution_factor(l, nl));
    Ok(ScaleDomainConfig {
        index: l,
        scale_domains: nl,
        resolution,
        step: resolution.scaled(spline_steps),
        curvature_tolerance: curvature_tolerance(l, t0),
    })
}

fn check_schedule_inputs(nl: usize, base: Resolution, t0: f64, spline_steps: f64) -> Result<()> {
    if nl < 1 {
        return Err(MccError::invalid(
            "nl",
            "the minimum number of scale domains is 1",
        ));
    }
    if !(t0.is_finite() && t0 > 0.0) {
        return Err(MccError::invalid(
            "t",
            format!("the curvature tolerance has to be > 0 (got {t0})"),
        ));
    }
    if !(spline_steps.is_finite() && spline_steps > 0.0) {
        return Err(MccError::invalid(
            "s",
            format!("the spline step parameter has to be > 0 (got {spline_steps})"),
        ));
    }
    if !base.is_positive() {
        return Err(MccError::invalid(
            "resolution",
            format!(
                "the base resolution has to be > 0 (got ew={}, ns={})",
                base.x, base.y
            ),
        ));
    }
    Ok(())
}

/// Full, validated schedule for a run.
#[derive(Clone, Debug)]
pub struct ScaleSchedule {
    domains: Vec<ScaleDomainConfig>,
}

impl ScaleSchedule {
    pub fn new(nl: usize, base: Resolution, t0: f64, spline_steps: f64) -> Result<Self> {
        check_schedule_inputs(nl, base, t0, spline_steps)?;
        let domains = (1..=nl)
            .map(|l| scale_domain(l, nl, base, t0, spline_steps))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { domains })
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> &[ScaleDomainConfig] {
        &self.domains
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScaleDomainConfig> {
        self.domains.iter()
    }
}
