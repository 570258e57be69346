use super::error::ScriptStoreError;
use super::{Direction, MigrationScript, ScriptDescriptor, ScriptStore};
use anyhow::Context as _;
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use mongodb::Database;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// File extension recognized as a command script.
pub const SCRIPT_EXTENSION: &str = "json";

/// Script store that enumerates command-script files in a directory.
///
/// Files are enumerated in lexicographic filename order, so the timestamp
/// prefix written by `create` keeps enumeration chronological. A file's
/// logical name is its stem with any leading all-digit prefix removed:
/// `20240101120000_create_users.json` and `create_users.json` both resolve
/// to `create_users`.
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ScriptStore for DirectoryStore {
    async fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, ScriptStoreError> {
        list_command_scripts(&self.dir).await
    }

    async fn load(
        &self,
        descriptor: &ScriptDescriptor,
    ) -> Result<Arc<dyn MigrationScript>, ScriptStoreError> {
        let path = descriptor
            .path
            .as_ref()
            .ok_or_else(|| ScriptStoreError::MissingScript(descriptor.name.clone()))?;
        let script = CommandScript::from_file(descriptor.name.clone(), path).await?;
        Ok(Arc::new(script))
    }
}

/// Enumerate `*.json` files under `dir` in filename order and resolve their
/// logical names. Shared with the seeder store, which uses the same on-disk
/// layout.
pub(crate) async fn list_command_scripts(
    dir: &Path,
) -> Result<Vec<ScriptDescriptor>, ScriptStoreError> {
    let unreadable = |source: std::io::Error| ScriptStoreError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let is_script = path.extension().and_then(|e| e.to_str()) == Some(SCRIPT_EXTENSION);
        if is_script && entry.file_type().await.map_err(unreadable)?.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut descriptors = Vec::with_capacity(files.len());
    for path in files {
        let name = logical_name(&path)?;
        descriptors.push(ScriptDescriptor { name, path: Some(path) });
    }
    debug!(dir = %dir.display(), count = descriptors.len(), "enumerated scripts");
    Ok(descriptors)
}

/// Resolve a script's logical name from its filename: strip the extension
/// and any leading `<digits>_` timestamp prefix. A name that comes out empty
/// or all digits is rejected rather than silently skipped.
pub(crate) fn logical_name(path: &Path) -> Result<String, ScriptStoreError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ScriptStoreError::InvalidName(path.to_path_buf()))?;

    let name = match stem.split_once('_') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
            rest
        }
        _ => stem,
    };

    if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScriptStoreError::InvalidName(path.to_path_buf()));
    }
    Ok(name.to_string())
}

/// Declarative migration script: ordered MongoDB command documents per
/// direction, executed via `Database::run_command`. The format deliberately
/// cannot express arbitrary code.
#[derive(Debug)]
pub struct CommandScript {
    name: String,
    pub(crate) up: Vec<Document>,
    pub(crate) down: Vec<Document>,
}

#[derive(Deserialize)]
struct CommandScriptFile {
    up: Vec<serde_json::Value>,
    // A script without a down section cannot be rolled back, but it can
    // still migrate.
    #[serde(default)]
    down: Vec<serde_json::Value>,
}

impl CommandScript {
    pub async fn from_file(name: String, path: &Path) -> Result<Self, ScriptStoreError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| ScriptStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CommandScriptFile =
            serde_json::from_str(&raw).map_err(|source| ScriptStoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let up = to_documents(&name, Direction::Up, file.up)?;
        let down = to_documents(&name, Direction::Down, file.down)?;
        Ok(Self { name, up, down })
    }
}

#[async_trait]
impl MigrationScript for CommandScript {
    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, db: &Database) -> anyhow::Result<()> {
        run_commands(db, &self.up).await
    }

    async fn down(&self, db: &Database) -> anyhow::Result<()> {
        run_commands(db, &self.down).await
    }
}

/// Convert JSON command entries to BSON documents; anything that does not
/// serialize to a document is rejected at load time, before execution
/// starts.
pub(crate) fn to_documents(
    name: &str,
    direction: Direction,
    commands: Vec<serde_json::Value>,
) -> Result<Vec<Document>, ScriptStoreError> {
    commands
        .into_iter()
        .enumerate()
        .map(|(index, value)| match bson::to_bson(&value) {
            Ok(Bson::Document(document)) => Ok(document),
            _ => Err(ScriptStoreError::InvalidCommand {
                name: name.to_string(),
                direction,
                index,
            }),
        })
        .collect()
}

/// Run command documents sequentially against the database.
pub(crate) async fn run_commands(db: &Database, commands: &[Document]) -> anyhow::Result<()> {
    for (index, command) in commands.iter().enumerate() {
        db.run_command(command.clone(), None)
            .await
            .with_context(|| format!("command {index} failed"))?;
    }
    Ok(())
}
