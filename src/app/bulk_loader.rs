//! Batched, back-pressured bulk loading.
//!
//! Rows are split into fixed-size chunks and written one chunk at a time, in
//! input order. The next chunk is not issued until the previous write has
//! resolved, so at most one write is ever outstanding. A failed chunk is
//! recorded in the [`LoadResult`] and the load moves on; nothing is retried.

use std::fmt::Display;
use std::future::Future;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::domain::{BatchSize, ChunkFailure, LoadError, LoadPlan, LoadResult, Progress};
use crate::ports::ChunkWriter;

/// Receives periodic progress reports (roughly every 10% of chunks, plus the last one).
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: Progress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(Progress),
{
    fn on_progress(&mut self, progress: Progress) {
        self(progress);
    }
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

/// Logs each report through `tracing` at info level.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, progress: Progress) {
        info!(
            completed = progress.completed,
            total = progress.total,
            "{}",
            progress
        );
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BulkLoader {
    batch_size: BatchSize,
}

impl BulkLoader {
    pub fn new(batch_size: i64) -> Result<Self, LoadError> {
        Ok(Self::with_batch_size(BatchSize::new(batch_size)?))
    }

    pub fn with_batch_size(batch_size: BatchSize) -> Self {
        Self { batch_size }
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn plan(&self, total_rows: usize) -> LoadPlan {
        LoadPlan::new(total_rows, self.batch_size)
    }

    /// Loads `rows` by calling `write` exactly once per chunk.
    ///
    /// `write` returns the store's affected-row count on success. Its errors are
    /// captured per chunk and never abort the load.
    pub async fn load_with<'r, R, W, Fut, E, O>(
        &self,
        rows: &'r [R],
        mut write: W,
        observer: &mut O,
    ) -> LoadResult
    where
        W: FnMut(&'r [R]) -> Fut,
        Fut: Future<Output = Result<u64, E>>,
        E: Display,
        O: ProgressObserver + ?Sized,
    {
        let plan = self.plan(rows.len());
        let span = info_span!(
            "load",
            run_id = %Uuid::new_v4(),
            batch_size = plan.batch_size().get()
        );

        async move {
            info!(
                total_rows = plan.total_rows(),
                total_chunks = plan.total_chunks(),
                "Inserting {} rows in {} batches",
                plan.total_rows(),
                plan.total_chunks()
            );

            let mut result = LoadResult::for_plan(&plan);
            for (index, range) in plan.chunks() {
                let chunk = &rows[range];
                match write(chunk).await {
                    Ok(affected) => {
                        debug!(chunk = index, size = chunk.len(), affected, "Chunk written");
                        result.record_success(chunk.len(), affected);
                    }
                    Err(e) => {
                        warn!(chunk = index, size = chunk.len(), error = %e, "Error inserting batch");
                        result.record_failure(ChunkFailure {
                            index,
                            size: chunk.len(),
                            error: e.to_string(),
                        });
                    }
                }

                let completed = index + 1;
                if plan.should_report(completed) {
                    observer.on_progress(Progress::new(completed, plan.total_chunks()));
                }
            }

            if !result.is_success() {
                warn!(
                    chunks_failed = result.chunks_failed,
                    rows_failed = result.rows_failed(),
                    "Load finished with failed chunks"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Same as [`BulkLoader::load_with`], driven through a [`ChunkWriter`].
    pub async fn load<R, O>(
        &self,
        rows: &[R],
        writer: &dyn ChunkWriter<R>,
        observer: &mut O,
    ) -> LoadResult
    where
        R: Sync,
        O: ProgressObserver + ?Sized,
    {
        self.load_with(rows, |chunk| writer.write_chunk(chunk), observer)
            .await
    }
}

/// One-shot form: validates `batch_size` before any write is issued.
pub async fn load<'r, R, W, Fut, E, O>(
    rows: &'r [R],
    write: W,
    batch_size: i64,
    observer: &mut O,
) -> Result<LoadResult, LoadError>
where
    W: FnMut(&'r [R]) -> Fut,
    Fut: Future<Output = Result<u64, E>>,
    E: Display,
    O: ProgressObserver + ?Sized,
{
    let loader = BulkLoader::new(batch_size)?;
    Ok(loader.load_with(rows, write, observer).await)
}
