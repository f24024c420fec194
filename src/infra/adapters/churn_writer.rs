use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::InsertWriter;
use crate::app::ports::{ChunkWriter, SqlExecutor, StoreError};
use crate::domain::Row;
use crate::sql::build_delete_newest;

/// Inserts each chunk, then deletes as many of the newest rows (by
/// `key_column`) as half the chunk, so engine counters see deletes
/// interleaved with inserts.
///
/// The reported count is the insert's; a failed delete fails the chunk.
pub struct ChurnWriter {
    insert: InsertWriter,
    executor: Arc<dyn SqlExecutor>,
    table: String,
    key_column: String,
}

impl ChurnWriter {
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        table: impl Into<String>,
        columns: Vec<String>,
        key_column: impl Into<String>,
    ) -> Self {
        let table = table.into();
        Self {
            insert: InsertWriter::new(Arc::clone(&executor), table.clone(), columns),
            executor,
            table,
            key_column: key_column.into(),
        }
    }
}

#[async_trait]
impl ChunkWriter<Row> for ChurnWriter {
    async fn write_chunk(&self, chunk: &[Row]) -> Result<u64, StoreError> {
        let inserted = self.insert.write_chunk(chunk).await?;

        let to_delete = chunk.len() as u64 / 2;
        if to_delete > 0 {
            let sql = build_delete_newest(&self.table, &self.key_column, to_delete);
            let deleted = self.executor.execute_write(&sql).await?.affected_rows;
            debug!(inserted, deleted, "Chunk churned");
        }
        Ok(inserted)
    }
}
