use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

/// Number of progress reports a load aims for (one every ~10%).
const PROGRESS_STEPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Invalid configuration: batch size must be positive, got {batch_size}")]
    InvalidConfiguration { batch_size: i64 },
}

/// Validated, strictly positive chunk length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub fn new(value: i64) -> Result<Self, LoadError> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(LoadError::InvalidConfiguration { batch_size: value })
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sizing metadata for one load, fixed before the first chunk runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    total_rows: usize,
    batch_size: BatchSize,
    total_chunks: usize,
}

impl LoadPlan {
    pub fn new(total_rows: usize, batch_size: BatchSize) -> Self {
        Self {
            total_rows,
            batch_size,
            total_chunks: total_rows.div_ceil(batch_size.get()),
        }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Row range covered by chunk `index`. The last chunk may be short.
    pub fn chunk_range(&self, index: usize) -> Range<usize> {
        let start = (index * self.batch_size.get()).min(self.total_rows);
        let end = (start + self.batch_size.get()).min(self.total_rows);
        start..end
    }

    /// Chunk indices with their row ranges, in load order.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.total_chunks).map(|index| (index, self.chunk_range(index)))
    }

    pub fn progress_threshold(&self) -> usize {
        self.total_chunks.div_ceil(PROGRESS_STEPS).max(1)
    }

    /// Whether completing `completed` chunks crosses a progress report point.
    pub fn should_report(&self, completed: usize) -> bool {
        completed > 0
            && (completed % self.progress_threshold() == 0 || completed == self.total_chunks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    pub fn is_final(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed {} of {} batches ({}%)",
            self.completed,
            self.total,
            self.percent.round()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkFailure {
    pub index: usize,
    pub size: usize,
    pub error: String,
}

/// Accumulated outcome of one load. Failures are kept in chunk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    pub rows_attempted: usize,
    pub rows_succeeded: usize,
    /// Sum of the affected-row counts the store reported for successful chunks.
    pub rows_affected: u64,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub failures: Vec<ChunkFailure>,
}

impl LoadResult {
    pub fn for_plan(plan: &LoadPlan) -> Self {
        Self {
            rows_attempted: plan.total_rows(),
            chunks_total: plan.total_chunks(),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, size: usize, affected: u64) {
        self.rows_succeeded += size;
        self.rows_affected += affected;
    }

    pub fn record_failure(&mut self, failure: ChunkFailure) {
        self.chunks_failed += 1;
        self.failures.push(failure);
    }

    pub fn rows_failed(&self) -> usize {
        self.failures.iter().map(|f| f.size).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn batch(n: i64) -> BatchSize {
        BatchSize::new(n).unwrap()
    }

    mod batch_size {
        use super::*;

        #[rstest]
        #[case(0)]
        #[case(-1)]
        #[case(i64::MIN)]
        fn non_positive_returns_invalid_configuration(#[case] value: i64) {
            assert_eq!(
                BatchSize::new(value),
                Err(LoadError::InvalidConfiguration { batch_size: value })
            );
        }

        #[test]
        fn positive_value_is_kept() {
            assert_eq!(batch(1000).get(), 1000);
        }
    }

    mod load_plan {
        use super::*;

        #[rstest]
        #[case(0, 1000, 0)]
        #[case(1, 1000, 1)]
        #[case(999, 1000, 1)]
        #[case(1000, 1000, 1)]
        #[case(1001, 1000, 2)]
        #[case(2500, 1000, 3)]
        #[case(10, 3, 4)]
        #[case(7, 1, 7)]
        fn total_chunks_is_ceiling_division(
            #[case] rows: usize,
            #[case] size: i64,
            #[case] expected: usize,
        ) {
            assert_eq!(LoadPlan::new(rows, batch(size)).total_chunks(), expected);
        }

        #[test]
        fn chunk_ranges_cover_all_rows_in_order() {
            let plan = LoadPlan::new(2500, batch(1000));
            let ranges: Vec<_> = plan.chunks().map(|(_, r)| r).collect();
            assert_eq!(ranges, vec![0..1000, 1000..2000, 2000..2500]);
        }

        #[test]
        fn chunk_sizes_sum_to_total_rows() {
            for rows in 0..50 {
                for size in 1..12 {
                    let plan = LoadPlan::new(rows, batch(size));
                    let sum: usize = plan.chunks().map(|(_, r)| r.len()).sum();
                    assert_eq!(sum, rows, "rows={rows} size={size}");
                }
            }
        }

        #[rstest]
        #[case(3, 1)]
        #[case(10, 1)]
        #[case(11, 2)]
        #[case(50, 5)]
        #[case(5000, 500)]
        fn progress_threshold_is_tenth_of_chunks(#[case] chunks: usize, #[case] expected: usize) {
            let plan = LoadPlan::new(chunks, batch(1));
            assert_eq!(plan.progress_threshold(), expected);
        }

        #[test]
        fn should_report_on_threshold_and_final_chunk() {
            let plan = LoadPlan::new(25, batch(1));
            let reported: Vec<_> = (1..=25).filter(|c| plan.should_report(*c)).collect();
            assert_eq!(reported, vec![3, 6, 9, 12, 15, 18, 21, 24, 25]);
        }

        #[test]
        fn empty_plan_never_reports() {
            let plan = LoadPlan::new(0, batch(10));
            assert!(!plan.should_report(0));
        }
    }

    mod progress {
        use super::*;

        #[test]
        fn display_rounds_percent() {
            let progress = Progress::new(1, 3);
            assert_eq!(progress.to_string(), "Completed 1 of 3 batches (33%)");
        }

        #[test]
        fn final_progress_is_hundred_percent() {
            let progress = Progress::new(4, 4);
            assert!(progress.is_final());
            assert_eq!(progress.percent, 100.0);
        }
    }

    mod load_result {
        use super::*;

        #[test]
        fn failures_accumulate_in_order() {
            let plan = LoadPlan::new(10, batch(3));
            let mut result = LoadResult::for_plan(&plan);
            result.record_success(3, 3);
            result.record_failure(ChunkFailure {
                index: 1,
                size: 3,
                error: "duplicate key".to_string(),
            });
            result.record_success(1, 1);

            assert_eq!(result.rows_attempted, 10);
            assert_eq!(result.rows_succeeded, 4);
            assert_eq!(result.rows_failed(), 3);
            assert_eq!(result.chunks_total, 4);
            assert_eq!(result.chunks_failed, 1);
            assert!(!result.is_success());
        }

        #[test]
        fn default_is_empty_success() {
            let result = LoadResult::default();
            assert!(result.is_success());
            assert_eq!(result.rows_failed(), 0);
        }
    }
}
