use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use seedload::app::ports::{MockSqlExecutor, StoreError};
use seedload::domain::WriteExecutionResult;

pub type Statements = Arc<Mutex<Vec<String>>>;

/// Writes `count` ninja rows (`name,life`) under `dir`.
pub fn write_ninja_csv(dir: &Path, count: usize) -> PathBuf {
    let mut content = String::from("name,life\n");
    for i in 0..count {
        writeln!(content, "Ninja_{},{}", i, i % 100).unwrap();
    }
    let path = dir.join("ninjas.csv");
    fs::write(&path, content).unwrap();
    path
}

/// Executor that records every write statement and rejects the ones at
/// `failing` positions. Successful writes report one affected row per tuple.
pub fn recording_executor(failing: &[usize]) -> (MockSqlExecutor, Statements) {
    let statements: Statements = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&statements);
    let failing = failing.to_vec();

    let mut executor = MockSqlExecutor::new();
    executor.expect_execute_write().returning(move |sql| {
        let mut seen = seen.lock().unwrap();
        seen.push(sql.to_string());
        let position = seen.len() - 1;
        if failing.contains(&position) {
            return Err(StoreError::QueryFailed(format!(
                "Duplicate entry in statement {}",
                position
            )));
        }
        Ok(WriteExecutionResult {
            affected_rows: sql.matches("), (").count() as u64 + 1,
            elapsed: Duration::from_millis(1),
        })
    });

    (executor, statements)
}
