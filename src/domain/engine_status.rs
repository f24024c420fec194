use serde::Serialize;

/// Counters scraped from the engine's free-text status report.
/// `None` means the counter was not found, which is distinct from a real zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatusSnapshot {
    pub pages_created: Option<u64>,
    pub free_buffers: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsDelta {
    pub pages_created: Option<i64>,
    /// Positive when free buffers shrank since the previous snapshot.
    pub free_buffer_drop: Option<i64>,
}

/// Previous-snapshot state for computing deltas between observations.
/// Owned by the caller; one tracker per measured stage.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    previous: EngineStatusSnapshot,
}

impl MetricsTracker {
    pub fn new() -> Self {
        // The first page delta is taken against zero.
        Self {
            previous: EngineStatusSnapshot {
                pages_created: Some(0),
                free_buffers: None,
            },
        }
    }

    pub fn observe(&mut self, current: EngineStatusSnapshot) -> MetricsDelta {
        let delta = MetricsDelta {
            pages_created: diff(current.pages_created, self.previous.pages_created),
            free_buffer_drop: diff(self.previous.free_buffers, current.free_buffers),
        };
        self.previous = current;
        delta
    }

    pub fn previous(&self) -> EngineStatusSnapshot {
        self.previous
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn diff(minuend: Option<u64>, subtrahend: Option<u64>) -> Option<i64> {
    Some(minuend? as i64 - subtrahend? as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pages: Option<u64>, free: Option<u64>) -> EngineStatusSnapshot {
        EngineStatusSnapshot {
            pages_created: pages,
            free_buffers: free,
        }
    }

    #[test]
    fn first_observation_measures_pages_from_zero() {
        let mut tracker = MetricsTracker::new();
        let delta = tracker.observe(snapshot(Some(120), Some(8000)));
        assert_eq!(delta.pages_created, Some(120));
        assert_eq!(delta.free_buffer_drop, None);
    }

    #[test]
    fn subsequent_observation_returns_differences() {
        let mut tracker = MetricsTracker::new();
        tracker.observe(snapshot(Some(120), Some(8000)));
        let delta = tracker.observe(snapshot(Some(150), Some(7900)));
        assert_eq!(delta.pages_created, Some(30));
        assert_eq!(delta.free_buffer_drop, Some(100));
    }

    #[test]
    fn growing_free_buffers_yields_negative_drop() {
        let mut tracker = MetricsTracker::new();
        tracker.observe(snapshot(Some(1), Some(100)));
        let delta = tracker.observe(snapshot(Some(1), Some(140)));
        assert_eq!(delta.free_buffer_drop, Some(-40));
        assert_eq!(delta.pages_created, Some(0));
    }

    #[test]
    fn missing_counter_yields_missing_delta() {
        let mut tracker = MetricsTracker::new();
        tracker.observe(snapshot(Some(10), Some(100)));
        let delta = tracker.observe(snapshot(None, None));
        assert_eq!(delta, MetricsDelta::default());
        assert_eq!(tracker.previous(), snapshot(None, None));
    }

    #[test]
    fn real_zero_is_not_treated_as_missing() {
        let mut tracker = MetricsTracker::new();
        tracker.observe(snapshot(Some(0), Some(0)));
        let delta = tracker.observe(snapshot(Some(0), Some(0)));
        assert_eq!(delta.pages_created, Some(0));
        assert_eq!(delta.free_buffer_drop, Some(0));
    }
}
