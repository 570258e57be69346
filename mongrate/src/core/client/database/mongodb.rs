use super::connection::Connection;
use super::error::DatabaseError;
use super::StateStore;
use crate::types::state::ExecutionRecord;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::Collection;
use std::sync::Arc;
use tracing::debug;

/// State store backed by a MongoDB collection.
///
/// One document per executed migration, shape
/// `{name, status: "EXECUTED", executedOn}`. The collection is created
/// lazily by the first insert.
pub struct MongoStateStore {
    connection: Arc<Connection>,
    collection_name: String,
}

impl MongoStateStore {
    pub fn new(connection: Arc<Connection>, collection_name: impl Into<String>) -> Self {
        Self { connection, collection_name: collection_name.into() }
    }

    async fn collection(&self) -> Result<Collection<ExecutionRecord>, DatabaseError> {
        Ok(self.connection.database().await?.collection(&self.collection_name))
    }
}

#[async_trait]
impl StateStore for MongoStateStore {
    async fn find_all(&self) -> Result<Vec<ExecutionRecord>, DatabaseError> {
        let collection = self.collection().await?;
        // The secondary _id sort keeps insertion order within a batch.
        let options = FindOptions::builder().sort(doc! { "executedOn": -1, "_id": 1 }).build();
        let cursor = collection.find(doc! {}, options).await?;
        let records: Vec<ExecutionRecord> = cursor.try_collect().await?;
        debug!(count = records.len(), collection = %self.collection_name, "fetched execution records");
        Ok(records)
    }

    async fn insert_many(&self, records: &[ExecutionRecord]) -> Result<(), DatabaseError> {
        if records.is_empty() {
            return Ok(());
        }
        let collection = self.collection().await?;
        collection.insert_many(records, None).await?;
        debug!(count = records.len(), collection = %self.collection_name, "recorded executed migrations");
        Ok(())
    }

    async fn delete_by_names(&self, names: &[String]) -> Result<u64, DatabaseError> {
        if names.is_empty() {
            return Ok(0);
        }
        let collection = self.collection().await?;
        let result = collection.delete_many(doc! { "name": { "$in": names.to_vec() } }, None).await?;
        debug!(deleted = result.deleted_count, collection = %self.collection_name, "removed execution records");
        Ok(result.deleted_count)
    }
}
