pub mod connection;
pub mod constant;
pub mod error;
pub mod mongodb;

use crate::types::state::ExecutionRecord;
use async_trait::async_trait;

pub use connection::Connection;
pub use error::DatabaseError;

/// Trait defining state-collection operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// find_all - every persisted execution record, most recent batch first
    /// (insertion order within a batch)
    async fn find_all(&self) -> Result<Vec<ExecutionRecord>, DatabaseError>;

    /// insert_many - persist a batch of execution records in a single write
    async fn insert_many(&self, records: &[ExecutionRecord]) -> Result<(), DatabaseError>;

    /// delete_by_names - remove the records for the given migration names,
    /// returning the number of documents deleted
    async fn delete_by_names(&self, names: &[String]) -> Result<u64, DatabaseError>;
}
