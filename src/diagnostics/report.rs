use super::scale::ScaleDomainReport;
use super::timing::TimingBreakdown;
use crate::mcc::MccParams;
use crate::types::Resolution;
use serde::Serialize;

/// Input side of a run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: usize,
    pub base_resolution: Resolution,
    pub params: MccParams,
}

/// Result trace returned by
/// [`MultiscaleClassifier::classify`](crate::MultiscaleClassifier::classify)
/// and [`MultiscaleClassifier::run`](crate::MultiscaleClassifier::run).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    pub input: InputDescriptor,
    pub scales: Vec<ScaleDomainReport>,
    pub ground_points: usize,
    pub nonground_points: usize,
    pub timings: TimingBreakdown,
}

impl ClassificationReport {
    /// Total filter invocations over all scale domains.
    pub fn total_iterations(&self) -> usize {
        self.scales.iter().map(|s| s.iterations.len()).sum()
    }

    /// Whether the run-wide point count is conserved.
    pub fn is_conserved(&self) -> bool {
        self.ground_points + self.nonground_points == self.input.points
    }

    pub fn print_text_summary(&self) {
        println!("Classification summary");
        if let Some(name) = &self.input.name {
            println!("  input: <{name}>");
        }
        println!("  input points: {}", self.input.points);
        println!(
            "  base resolution: ew={:.4} ns={:.4}",
            self.input.base_resolution.x, self.input.base_resolution.y
        );
        let p = &self.input.params;
        println!(
            "  params: nl={} t={} j={} f={} s={} filter={}",
            p.scale_domains,
            p.curvature_tolerance,
            p.convergence_threshold,
            p.tension,
            p.spline_steps,
            p.direction
        );
        for scale in &self.scales {
            if scale.skipped {
                println!("  scale domain {}: skipped (no candidates left)", scale.index);
                continue;
            }
            println!(
                "  scale domain {}: res=({:.4}, {:.4}) t={:.4} iterations={} non-ground={} remaining={} ratio={} ({:.1} ms)",
                scale.index,
                scale.resolution.x,
                scale.resolution.y,
                scale.curvature_tolerance,
                scale.iterations.len(),
                scale.outliers(),
                scale.remaining().unwrap_or(0),
                format_optional(scale.final_ratio()),
                scale.elapsed_ms
            );
        }
        println!("  ground points: {}", self.ground_points);
        println!("  non-ground points: {}", self.nonground_points);
        for stage in &self.timings.stages {
            println!("  {}: {:.3} ms", stage.label, stage.elapsed_ms);
        }
        println!("  total_ms: {:.3}", self.timings.total_ms);
    }
}

fn format_optional(val: Option<f64>) -> String {
    val.map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}
