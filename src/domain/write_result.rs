use std::time::Duration;

/// Outcome of one write statement as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteExecutionResult {
    pub affected_rows: u64,
    pub elapsed: Duration,
}

impl WriteExecutionResult {
    pub fn execution_time_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
