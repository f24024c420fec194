pub mod connection;
pub mod elapsed;
pub mod engine_status;
pub mod load;
pub mod row;
pub mod stats;
pub mod write_result;

pub use connection::ConnectionProfile;
pub use elapsed::format_elapsed;
pub use engine_status::{EngineStatusSnapshot, MetricsDelta, MetricsTracker};
pub use load::{BatchSize, ChunkFailure, LoadError, LoadPlan, LoadResult, Progress};
pub use row::{Row, SqlValue};
pub use stats::{SampleSummary, StageStats, StageSummary};
pub use write_result::WriteExecutionResult;
