use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{MetricsTracker, StageStats};
use crate::ports::{ChunkWriter, EngineStatusSource, StoreError};

struct StageState {
    stats: StageStats,
    tracker: MetricsTracker,
}

/// Wraps a writer to time every successful chunk and, when a status source is
/// attached, sample engine counters right after it.
pub struct InstrumentedWriter<'a, R> {
    inner: &'a dyn ChunkWriter<R>,
    probe: Option<&'a dyn EngineStatusSource>,
    state: Mutex<StageState>,
}

impl<'a, R> InstrumentedWriter<'a, R> {
    pub fn new(inner: &'a dyn ChunkWriter<R>, probe: Option<&'a dyn EngineStatusSource>) -> Self {
        Self {
            inner,
            probe,
            state: Mutex::new(StageState {
                stats: StageStats::new(),
                tracker: MetricsTracker::new(),
            }),
        }
    }

    pub fn into_stats(self) -> StageStats {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .stats
    }

    fn lock(&self) -> MutexGuard<'_, StageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<'a, R: Sync> ChunkWriter<R> for InstrumentedWriter<'a, R> {
    async fn write_chunk(&self, chunk: &[R]) -> Result<u64, StoreError> {
        let started = Instant::now();
        let affected = self.inner.write_chunk(chunk).await?;
        self.lock().stats.record_write(started.elapsed());

        if let Some(probe) = self.probe {
            // Metrics are best-effort; a failed probe never fails the chunk.
            match probe.snapshot().await {
                Ok(snapshot) => {
                    let mut state = self.lock();
                    let delta = state.tracker.observe(snapshot);
                    debug!(?snapshot, ?delta, "Engine status sampled");
                    state.stats.record_metrics(delta);
                }
                Err(e) => warn!(error = %e, "Failed to read engine status"),
            }
        }

        Ok(affected)
    }
}
