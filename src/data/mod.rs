//! Transaction records and batches

pub mod batch;
pub mod record;

pub use batch::TransactionBatch;
pub use record::TransactionRecord;
