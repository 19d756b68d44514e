//! Run configuration loaded from JSON and merged with command-line flags.
//!
//! A configuration file may set any subset of the fields below; missing
//! fields take their defaults. Flags given on the command line win over the
//! file.
//!
//! ```json
//! {
//!   "storeDir": "data",
//!   "params": { "scaleDomains": 3, "curvatureTolerance": 0.3 },
//!   "surface": { "maxNeighbours": 128 },
//!   "region": { "ewres": 1.5, "nsres": 1.5 },
//!   "reportJson": "out/report.json"
//! }
//! ```

use crate::error::{MccError, Result};
use crate::filter::SurfaceOptions;
use crate::mcc::MccParams;
use crate::store::Region;
use crate::types::FilterDirection;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    /// Directory holding the `<name>.xyz` collections.
    pub store_dir: Option<PathBuf>,
    pub params: MccParams,
    pub surface: SurfaceOptions,
    /// Fixed base resolution; estimated from the input when absent.
    pub region: Option<Region>,
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| MccError::Config(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&data)
        .map_err(|e| MccError::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Parameter values given explicitly on the command line.
#[derive(Clone, Debug, Default)]
pub struct ParamOverrides {
    pub scale_domains: Option<usize>,
    pub curvature_tolerance: Option<f64>,
    pub convergence_threshold: Option<f64>,
    pub tension: Option<f64>,
    pub spline_steps: Option<f64>,
    /// `-n`: filter negative outliers.
    pub negative: bool,
}

impl ParamOverrides {
    pub fn resolve(&self, base: &MccParams) -> MccParams {
        let mut p = base.clone();
        if let Some(v) = self.scale_domains {
            p.scale_domains = v;
        }
        if let Some(v) = self.curvature_tolerance {
            p.curvature_tolerance = v;
        }
        if let Some(v) = self.convergence_threshold {
            p.convergence_threshold = v;
        }
        if let Some(v) = self.tension {
            p.tension = v;
        }
        if let Some(v) = self.spline_steps {
            p.spline_steps = v;
        }
        if self.negative {
            p.direction = FilterDirection::Negative;
        }
        p
    }
}

/// Region from `ewres` / `nsres` flags; a single flag sets square cells.
pub fn resolve_region(
    ewres: Option<f64>,
    nsres: Option<f64>,
    fallback: Option<Region>,
) -> Option<Region> {
    match (ewres, nsres) {
        (Some(ew), Some(ns)) => Some(Region::new(ew, ns)),
        (Some(res), None) | (None, Some(res)) => Some(Region::new(res, res)),
        (None, None) => fallback,
    }
}
