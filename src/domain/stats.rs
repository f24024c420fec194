use std::time::Duration;

use serde::Serialize;

use super::engine_status::MetricsDelta;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleSummary {
    /// `None` for an empty sample set; a mean of zero would hide "no data".
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().sum();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: samples.len(),
            mean: sum / samples.len() as f64,
            min,
            max,
        })
    }
}

/// Per-stage measurements: write latency per chunk plus engine counter deltas.
#[derive(Debug, Clone, Default)]
pub struct StageStats {
    write_latencies_ms: Vec<f64>,
    pages_created_deltas: Vec<f64>,
    free_buffer_drops: Vec<f64>,
}

impl StageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&mut self, elapsed: Duration) {
        self.write_latencies_ms.push(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_metrics(&mut self, delta: MetricsDelta) {
        if let Some(pages) = delta.pages_created {
            self.pages_created_deltas.push(pages as f64);
        }
        // Only actual drops are tracked; buffers being returned is noise here.
        if let Some(drop) = delta.free_buffer_drop
            && drop > 0
        {
            self.free_buffer_drops.push(drop as f64);
        }
    }

    pub fn writes_recorded(&self) -> usize {
        self.write_latencies_ms.len()
    }

    pub fn summary(&self) -> StageSummary {
        StageSummary {
            write_latency_ms: SampleSummary::from_samples(&self.write_latencies_ms),
            pages_created: SampleSummary::from_samples(&self.pages_created_deltas),
            free_buffer_drops: SampleSummary::from_samples(&self.free_buffer_drops),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageSummary {
    pub write_latency_ms: Option<SampleSummary>,
    pub pages_created: Option<SampleSummary>,
    pub free_buffer_drops: Option<SampleSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_have_no_summary() {
        assert_eq!(SampleSummary::from_samples(&[]), None);
    }

    #[test]
    fn summary_reports_mean_min_max() {
        let summary = SampleSummary::from_samples(&[2.0, 4.0, 9.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn write_latency_is_recorded_in_millis() {
        let mut stats = StageStats::new();
        stats.record_write(Duration::from_millis(12));
        stats.record_write(Duration::from_millis(8));

        let latency = stats.summary().write_latency_ms.unwrap();
        assert_eq!(stats.writes_recorded(), 2);
        assert!((latency.mean - 10.0).abs() < 1e-9);
    }

    #[test]
    fn only_positive_buffer_drops_are_kept() {
        let mut stats = StageStats::new();
        stats.record_metrics(MetricsDelta {
            pages_created: Some(5),
            free_buffer_drop: Some(-3),
        });
        stats.record_metrics(MetricsDelta {
            pages_created: Some(7),
            free_buffer_drop: Some(0),
        });
        stats.record_metrics(MetricsDelta {
            pages_created: None,
            free_buffer_drop: Some(40),
        });

        let summary = stats.summary();
        assert_eq!(summary.pages_created.unwrap().mean, 6.0);
        let drops = summary.free_buffer_drops.unwrap();
        assert_eq!(drops.count, 1);
        assert_eq!(drops.mean, 40.0);
    }

    #[test]
    fn no_metrics_yields_empty_summary() {
        let stats = StageStats::new();
        assert_eq!(stats.summary(), StageSummary::default());
    }
}
