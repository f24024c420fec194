pub mod chunk_writer;
pub mod engine_status_source;
pub mod sql_executor;

pub use chunk_writer::ChunkWriter;
pub use engine_status_source::EngineStatusSource;
pub use sql_executor::{SqlExecutor, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use engine_status_source::MockEngineStatusSource;
#[cfg(any(test, feature = "test-support"))]
pub use sql_executor::MockSqlExecutor;
