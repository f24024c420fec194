use std::time::{Duration, Instant};

use serde::Serialize;

use crate::bulk_loader::{BulkLoader, ProgressObserver};
use crate::domain::{BatchSize, LoadResult, SampleSummary, StageSummary, format_elapsed};
use crate::instrumented_writer::InstrumentedWriter;
use crate::ports::{ChunkWriter, EngineStatusSource};

/// One measured load: the loader's result plus timing and engine metrics.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub target: String,
    pub batch_size: BatchSize,
    pub elapsed_ms: u64,
    pub result: LoadResult,
    pub metrics: StageSummary,
}

impl StageReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Completed inserting {} records into {} in batches of {}.",
                self.result.rows_attempted, self.target, self.batch_size
            ),
            format!("Time taken for this stage: {}.", format_elapsed(self.elapsed())),
            format!(
                "Rows succeeded: {}, failed chunks: {} ({} rows)",
                self.result.rows_succeeded,
                self.result.chunks_failed,
                self.result.rows_failed()
            ),
        ];

        for failure in &self.result.failures {
            lines.push(format!(
                "  chunk #{} ({} rows): {}",
                failure.index, failure.size, failure.error
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Performance Summary for Batch Size: {}",
            self.batch_size
        ));
        lines.push(format!(
            "Average Insertion Time per Batch: {}",
            mean_display(self.metrics.write_latency_ms, " ms")
        ));
        lines.push(format!(
            "Average Pages Created Change: {}",
            mean_display(self.metrics.pages_created, "")
        ));
        lines.push(format!(
            "Average Free Buffer Drops: {}",
            mean_display(self.metrics.free_buffer_drops, "")
        ));
        lines
    }
}

fn mean_display(summary: Option<SampleSummary>, unit: &str) -> String {
    match summary {
        Some(s) => format!("{:.2}{}", s.mean, unit),
        None => "n/a".to_string(),
    }
}

/// Runs one load through `writer`, timing each chunk and sampling engine
/// counters after each one when `probe` is given.
pub async fn run_stage<R, O>(
    target: &str,
    loader: &BulkLoader,
    rows: &[R],
    writer: &dyn ChunkWriter<R>,
    probe: Option<&dyn EngineStatusSource>,
    observer: &mut O,
) -> StageReport
where
    R: Sync,
    O: ProgressObserver + ?Sized,
{
    let instrumented = InstrumentedWriter::new(writer, probe);
    let started = Instant::now();
    let result = loader.load(rows, &instrumented, observer).await;
    let elapsed = started.elapsed();

    StageReport {
        target: target.to_string(),
        batch_size: loader.batch_size(),
        elapsed_ms: elapsed.as_millis() as u64,
        result,
        metrics: instrumented.into_stats().summary(),
    }
}
