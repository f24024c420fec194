use async_trait::async_trait;

use super::StoreError;

/// Writes one chunk of rows as a single operation and reports rows affected.
#[async_trait]
pub trait ChunkWriter<R>: Send + Sync {
    async fn write_chunk(&self, chunk: &[R]) -> Result<u64, StoreError>;
}
