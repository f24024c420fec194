//! Repeated point lookups for comparing indexed and non-indexed access paths.

use std::num::NonZeroU32;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{Instrument, info, info_span};

use crate::domain::format_elapsed;
use crate::ports::{SqlExecutor, StoreError};

/// Replaced with the 1-based iteration number in every query.
pub const ITERATION_PLACEHOLDER: &str = "{n}";

#[derive(Debug, Error)]
#[error("Query {iteration} of [{label}] failed: {source}")]
pub struct StressError {
    pub label: String,
    pub iteration: u32,
    pub source: StoreError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StressReport {
    pub label: String,
    pub iterations: u32,
    pub rows_retrieved: u64,
    pub elapsed_ms: u64,
}

impl StressReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn mean_query_ms(&self) -> f64 {
        self.elapsed_ms as f64 / f64::from(self.iterations)
    }

    pub fn summary_line(&self) -> String {
        format!(
            "[{}] Retrieved a total of {} rows in {} ({} queries, {:.2} ms per query).",
            self.label,
            self.rows_retrieved,
            format_elapsed(self.elapsed()),
            self.iterations,
            self.mean_query_ms()
        )
    }
}

/// Fires at most once per `interval`, measured from when it last fired.
#[derive(Debug, Clone, Copy)]
pub struct IntervalLog {
    interval: Duration,
    last: Instant,
}

impl IntervalLog {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) > self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

pub fn render_query(template: &str, iteration: u32) -> String {
    template.replace(ITERATION_PLACEHOLDER, &iteration.to_string())
}

/// Batch output carries one line per row and no header.
fn count_rows(output: &str) -> u64 {
    output.lines().filter(|line| !line.trim().is_empty()).count() as u64
}

/// Runs `template` `iterations` times, one query at a time, and stops at the
/// first failing query.
pub async fn run_stress(
    executor: &dyn SqlExecutor,
    label: &str,
    template: &str,
    iterations: NonZeroU32,
    log_interval: Duration,
) -> Result<StressReport, StressError> {
    let total = iterations.get();
    let span = info_span!("stress", label, iterations = total);

    async move {
        info!("Running {} queries for [{}]", total, label);
        let started = Instant::now();
        let mut progress_log = IntervalLog::new(log_interval, started);
        let mut rows_retrieved = 0;

        for iteration in 1..=total {
            let output = executor
                .execute_query(&render_query(template, iteration))
                .await
                .map_err(|source| StressError {
                    label: label.to_string(),
                    iteration,
                    source,
                })?;
            rows_retrieved += count_rows(&output);

            let now = Instant::now();
            if progress_log.tick(now) {
                info!(
                    "[{}] Progress: {:.2}% completed. Elapsed time: {}",
                    label,
                    f64::from(iteration) / f64::from(total) * 100.0,
                    format_elapsed(now - started)
                );
            }
        }

        Ok(StressReport {
            label: label.to_string(),
            iterations: total,
            rows_retrieved,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
    .instrument(span)
    .await
}
