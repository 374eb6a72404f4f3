pub mod connection;
pub mod records;

pub use records::{AppendOutcome, RecordsRepository};
