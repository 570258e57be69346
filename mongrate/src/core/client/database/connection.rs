use super::error::DatabaseError;
use mongodb::{Client, Database};
use tokio::sync::Mutex;
use tracing::debug;

/// Lazily-established MongoDB connection shared by the engine and its
/// collaborators.
///
/// The client is created on first use and released by [`dispose`]. Once
/// disposed, every later call fails with [`DatabaseError::Disposed`]; the
/// connection is never silently re-established.
///
/// [`dispose`]: Connection::dispose
pub struct Connection {
    uri: String,
    database_name: String,
    slot: Mutex<Slot>,
}

enum Slot {
    Idle,
    Connected(Client),
    Disposed,
}

impl Connection {
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self { uri: uri.into(), database_name: database_name.into(), slot: Mutex::new(Slot::Idle) }
    }

    /// Handle to the configured database, connecting on first use.
    ///
    /// The driver hands out cheap clones of an internally shared client, so
    /// callers may hold the returned handle for the duration of one
    /// operation without blocking others.
    pub async fn database(&self) -> Result<Database, DatabaseError> {
        let mut slot = self.slot.lock().await;
        match &*slot {
            Slot::Disposed => Err(DatabaseError::Disposed),
            Slot::Connected(client) => Ok(client.database(&self.database_name)),
            Slot::Idle => {
                let client = Client::with_uri_str(&self.uri).await?;
                debug!(database = %self.database_name, "established MongoDB connection");
                let database = client.database(&self.database_name);
                *slot = Slot::Connected(client);
                Ok(database)
            }
        }
    }

    /// Release the connection. The driver closes its pool once the last
    /// client clone is dropped.
    pub async fn dispose(&self) -> Result<(), DatabaseError> {
        let mut slot = self.slot.lock().await;
        if !matches!(*slot, Slot::Disposed) {
            debug!("disposing MongoDB connection");
        }
        *slot = Slot::Disposed;
        Ok(())
    }
}
