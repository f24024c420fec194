use async_trait::async_trait;
use thiserror::Error;

use crate::domain::WriteExecutionResult;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Operation timed out after {0}s")]
    Timeout(u64),
}

/// Raw statement execution against the external store.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute_write(&self, sql: &str) -> Result<WriteExecutionResult, StoreError>;

    /// Returns the store's raw text output.
    async fn execute_query(&self, sql: &str) -> Result<String, StoreError>;
}
