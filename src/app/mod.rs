pub use seedload_domain as domain;

pub mod bulk_loader;
pub mod instrumented_writer;
pub mod poller;
pub mod ports;
pub mod stage;
pub mod stress;

pub use bulk_loader::{BulkLoader, LogProgress, NoProgress, ProgressObserver};
pub use poller::{PollConfig, PollError, PollOutcome, poll_until_below_limit};
pub use stage::{StageReport, run_stage};
pub use stress::{StressError, StressReport, run_stress};
