use serde::Serialize;
use std::time::Instant;

/// Milliseconds elapsed since `start`.
#[inline]
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// One labelled duration of a classification run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Per-stage durations plus the wall-clock total of the classification.
///
/// Stages are kept in the order they were recorded: one entry per scale
/// domain, followed by `load` and `write` for store-backed runs.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }

    /// Record the time elapsed since `start` under `label`.
    pub fn record(&mut self, label: impl Into<String>, start: Instant) {
        self.push(label, elapsed_ms(start));
    }

    /// Duration of the first stage called `label`.
    pub fn stage(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }

    pub fn stages_ms(&self) -> f64 {
        self.stages.iter().map(|s| s.elapsed_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_keep_order_and_sum() {
        let mut timings = TimingBreakdown::default();
        timings.push("scale domain 1", 2.5);
        timings.push("scale domain 2", 1.5);
        timings.record("write", Instant::now());
        assert_eq!(timings.stages[0].label, "scale domain 1");
        assert_eq!(timings.stage("scale domain 2"), Some(1.5));
        assert!(timings.stage("load").is_none());
        assert!(timings.stages_ms() >= 4.0);
    }
}
