pub use seedload_app as app;
pub use seedload_domain as domain;
pub use seedload_infra as infra;

pub mod cli;
pub mod commands;
pub mod error;
pub mod telemetry;
