use super::error::ScriptStoreError;
use super::{MigrationScript, ScriptDescriptor, ScriptStore};
use async_trait::async_trait;
use futures::future::BoxFuture;
use mongodb::Database;
use std::future::Future;
use std::sync::Arc;

/// In-memory, ordered registry of migration handlers.
///
/// Registration order is the enumeration order. This is the store to use
/// when migrations are Rust code compiled into the host application, and it
/// doubles as a deterministic fixture for tests.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: Vec<Arc<dyn MigrationScript>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the enumeration.
    pub fn register(&mut self, script: Arc<dyn MigrationScript>) -> &mut Self {
        self.scripts.push(script);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, script: Arc<dyn MigrationScript>) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }
}

#[async_trait]
impl ScriptStore for ScriptRegistry {
    async fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError> {
        Ok(self.scripts.iter().map(|script| ScriptDescriptor::named(script.name())).collect())
    }

    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn MigrationScript>, ScriptStoreError> {
        self.scripts
            .iter()
            .find(|script| script.name() == descriptor.name)
            .cloned()
            .ok_or_else(|| ScriptStoreError::NotRegistered(descriptor.name.clone()))
    }
}

type ScriptUnit = Box<dyn Fn(Database) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Adapts a pair of async closures into a [`MigrationScript`].
pub struct FnScript {
    name: String,
    up: ScriptUnit,
    down: ScriptUnit,
}

impl FnScript {
    pub fn new<U, UFut, D, DFut>(name: impl Into<String>, up: U, down: D) -> Self
    where
        U: Fn(Database) -> UFut + Send + Sync + 'static,
        UFut: Future<Output = anyhow::Result<()>> + Send + 'static,
        D: Fn(Database) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            up: Box::new(move |db| Box::pin(up(db))),
            down: Box::new(move |db| Box::pin(down(db))),
        }
    }
}

#[async_trait]
impl MigrationScript for FnScript {
    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, db: &Database) -> anyhow::Result<()> {
        (self.up)(db.clone()).await
    }

    async fn down(&self, db: &Database) -> anyhow::Result<()> {
        (self.down)(db.clone()).await
    }
}
