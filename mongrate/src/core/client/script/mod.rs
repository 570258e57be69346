pub mod directory;
pub mod error;
pub mod registry;
pub mod stub;

use async_trait::async_trait;
use mongodb::Database;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub use directory::DirectoryStore;
pub use error::ScriptStoreError;
pub use registry::{FnScript, ScriptRegistry};

/// Direction a script unit is executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    /// Seeder unit; seeders only run forward.
    Run,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Run => write!(f, "run"),
        }
    }
}

/// A discovered migration script, prior to loading its executable units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    /// Logical name: the file stem stripped of any leading timestamp prefix.
    pub name: String,
    /// Backing file, when the script comes from a directory store.
    pub path: Option<PathBuf>,
}

impl ScriptDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), path: None }
    }
}

/// An executable migration: a pair of async units run against the live
/// database handle.
#[async_trait]
pub trait MigrationScript: Send + Sync {
    fn name(&self) -> &str;

    /// Invoked on migrate.
    async fn up(&self, db: &Database) -> anyhow::Result<()>;

    /// Invoked on rollback.
    async fn down(&self, db: &Database) -> anyhow::Result<()>;
}

/// Source of migration scripts.
///
/// Enumeration order is the only ordering guarantee the engine relies on:
/// pending migrations are applied in exactly this order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptStore: Send + Sync {
    /// Ordered enumeration of every known script.
    async fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError>;

    /// Load the executable units for a previously listed script.
    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn MigrationScript>, ScriptStoreError>;
}
