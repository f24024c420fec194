use std::sync::Arc;

use async_trait::async_trait;

use crate::app::ports::{ChunkWriter, SqlExecutor, StoreError};
use crate::domain::Row;
use crate::sql::build_insert;

/// Writes each chunk as one multi-row `INSERT` statement.
pub struct InsertWriter {
    executor: Arc<dyn SqlExecutor>,
    table: String,
    columns: Vec<String>,
}

impl InsertWriter {
    pub fn new(executor: Arc<dyn SqlExecutor>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            executor,
            table: table.into(),
            columns,
        }
    }
}

#[async_trait]
impl ChunkWriter<Row> for InsertWriter {
    async fn write_chunk(&self, chunk: &[Row]) -> Result<u64, StoreError> {
        let sql = build_insert(&self.table, &self.columns, chunk);
        let result = self.executor.execute_write(&sql).await?;
        Ok(result.affected_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::app::ports::MockSqlExecutor;
    use crate::domain::{SqlValue, WriteExecutionResult};

    fn rows() -> Vec<Row> {
        vec![
            vec![SqlValue::from("Ninja_0"), SqlValue::Int(90)],
            vec![SqlValue::from("Ninja_1"), SqlValue::Int(55)],
        ]
    }

    #[tokio::test]
    async fn chunk_becomes_single_insert_statement() {
        let mut executor = MockSqlExecutor::new();
        executor
            .expect_execute_write()
            .withf(|sql| {
                sql.to_string()
                    == "INSERT INTO `Ninja` (`name`, `life`) VALUES ('Ninja_0', 90), ('Ninja_1', 55)"
            })
            .times(1)
            .returning(|_| {
                Ok(WriteExecutionResult {
                    affected_rows: 2,
                    elapsed: Duration::from_millis(3),
                })
            });
        let writer = InsertWriter::new(
            Arc::new(executor),
            "Ninja",
            vec!["name".to_string(), "life".to_string()],
        );

        assert_eq!(writer.write_chunk(&rows()).await, Ok(2));
    }

    #[tokio::test]
    async fn store_error_is_passed_through() {
        let mut executor = MockSqlExecutor::new();
        executor
            .expect_execute_write()
            .returning(|_| Err(StoreError::QueryFailed("Duplicate entry 'Ninja_0'".to_string())));
        let writer = InsertWriter::new(Arc::new(executor), "Ninja", vec![]);

        let result = writer.write_chunk(&rows()).await;

        assert_eq!(
            result,
            Err(StoreError::QueryFailed("Duplicate entry 'Ninja_0'".to_string()))
        );
    }
}
