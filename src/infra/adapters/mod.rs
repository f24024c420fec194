pub mod churn_writer;
pub mod insert_writer;
pub mod mysql;

pub use churn_writer::ChurnWriter;
pub use insert_writer::InsertWriter;
pub use mysql::MySqlAdapter;
