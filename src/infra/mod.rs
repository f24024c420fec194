pub use seedload_app as app;
pub use seedload_domain as domain;

pub mod adapters;
pub mod config;
pub mod engine_status;
pub mod source;
pub mod sql;
