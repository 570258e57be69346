use super::script::directory::{list_command_scripts, run_commands, to_documents};
use super::script::{Direction, ScriptDescriptor, ScriptStoreError};
use async_trait::async_trait;
use futures::future::BoxFuture;
use mongodb::bson::Document;
use mongodb::Database;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// A data seeder: a single repeatable `run` unit.
///
/// Seeders are not tracked in the state collection; running one twice is the
/// caller's concern.
#[async_trait]
pub trait Seeder: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, db: &Database) -> anyhow::Result<()>;
}

/// Source of seeders; enumeration order is execution order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeederStore: Send + Sync {
    async fn list_seeders(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError>;

    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn Seeder>, ScriptStoreError>;
}

/// Seeder store over `{"run": [...]}` command-script files, using the same
/// directory layout and naming rules as the migration script store.
pub struct DirectorySeederStore {
    dir: PathBuf,
}

impl DirectorySeederStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[derive(Deserialize)]
struct SeederFile {
    run: Vec<serde_json::Value>,
}

struct CommandSeeder {
    name: String,
    run: Vec<Document>,
}

#[async_trait]
impl Seeder for CommandSeeder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, db: &Database) -> anyhow::Result<()> {
        run_commands(db, &self.run).await
    }
}

#[async_trait]
impl SeederStore for DirectorySeederStore {
    async fn list_seeders(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError> {
        list_command_scripts(&self.dir).await
    }

    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn Seeder>, ScriptStoreError> {
        let path = descriptor
            .path
            .as_ref()
            .ok_or_else(|| ScriptStoreError::MissingScript(descriptor.name.clone()))?;
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| ScriptStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let file: SeederFile =
            serde_json::from_str(&raw).map_err(|source| ScriptStoreError::Parse {
                path: path.clone(),
                source,
            })?;
        let run = to_documents(&descriptor.name, Direction::Run, file.run)?;
        Ok(Arc::new(CommandSeeder { name: descriptor.name.clone(), run }))
    }
}

/// In-memory, ordered registry of seeders, mirroring the script registry.
#[derive(Default)]
pub struct SeederRegistry {
    seeders: Vec<Arc<dyn Seeder>>,
}

impl SeederRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, seeder: Arc<dyn Seeder>) -> &mut Self {
        self.seeders.push(seeder);
        self
    }

    pub fn with(mut self, seeder: Arc<dyn Seeder>) -> Self {
        self.seeders.push(seeder);
        self
    }
}

#[async_trait]
impl SeederStore for SeederRegistry {
    async fn list_seeders(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError> {
        Ok(self.seeders.iter().map(|seeder| ScriptDescriptor::named(seeder.name())).collect())
    }

    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn Seeder>, ScriptStoreError> {
        self.seeders
            .iter()
            .find(|seeder| seeder.name() == descriptor.name)
            .cloned()
            .ok_or_else(|| ScriptStoreError::NotRegistered(descriptor.name.clone()))
    }
}

type SeederUnit = Box<dyn Fn(Database) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Adapts an async closure into a [`Seeder`].
pub struct FnSeeder {
    name: String,
    run: SeederUnit,
}

impl FnSeeder {
    pub fn new<R, RFut>(name: impl Into<String>, run: R) -> Self
    where
        R: Fn(Database) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self { name: name.into(), run: Box::new(move |db| Box::pin(run(db))) }
    }
}

#[async_trait]
impl Seeder for FnSeeder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, db: &Database) -> anyhow::Result<()> {
        (self.run)(db.clone()).await
    }
}
