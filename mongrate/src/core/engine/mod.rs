pub mod error;

use crate::config::MigratorConfig;
use crate::core::client::database::mongodb::MongoStateStore;
use crate::core::client::database::{Connection, StateStore};
use crate::core::client::script::{
    Direction, DirectoryStore, ScriptDescriptor, ScriptStore, ScriptStoreError,
};
use crate::core::client::seeder::{DirectorySeederStore, SeederStore};
use crate::error::MongrateResult;
use crate::types::state::{ExecutionRecord, StateEntry};
use chrono::Utc;
use error::{ExecutionError, ScriptFailure};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info};

/// What to do with the remainder of a batch after one script fails.
///
/// There is never an automatic compensating rollback of scripts that already
/// succeeded in the same call; the policy only controls whether the rest of
/// the batch still runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the remaining sequence on the first failure.
    #[default]
    FailFast,
    /// Run the remaining scripts and report every failure together.
    ContinueOnError,
}

/// Reconciles discovered migration scripts against persisted execution
/// records and drives them forward (`migrate`) or backward (`rollback`).
///
/// Scripts within one call run strictly sequentially, in script-store
/// enumeration order; later scripts may depend on what earlier ones did.
pub struct Migrator {
    scripts: Arc<dyn ScriptStore>,
    seeders: Arc<dyn SeederStore>,
    state: Arc<dyn StateStore>,
    connection: Arc<Connection>,
    policy: FailurePolicy,
}

impl Migrator {
    pub fn new(
        scripts: Arc<dyn ScriptStore>,
        seeders: Arc<dyn SeederStore>,
        state: Arc<dyn StateStore>,
        connection: Arc<Connection>,
    ) -> Self {
        Self { scripts, seeders, state, connection, policy: FailurePolicy::default() }
    }

    /// Engine wired to the directory stores and the MongoDB state collection
    /// described by `config`.
    pub fn from_config(config: &MigratorConfig) -> MongrateResult<Self> {
        let uri = config.database.connection_uri()?;
        let database_name = config.database.database_name()?;
        let connection = Arc::new(Connection::new(uri, database_name));
        let state = Arc::new(MongoStateStore::new(connection.clone(), config.collection_name.clone()));
        Ok(Self {
            scripts: Arc::new(DirectoryStore::new(config.migrations_dir.clone())),
            seeders: Arc::new(DirectorySeederStore::new(config.seeders_dir.clone())),
            state,
            connection,
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reconciled view: every persisted record (most recent batch first,
    /// insertion order within a batch) followed by every discovered script
    /// without a record, tagged pending, in enumeration order.
    ///
    /// A persisted record whose script file has gone missing is still
    /// reported; the persisted truth is authoritative here. It only becomes
    /// an error once `rollback` needs the script's `down` unit.
    pub async fn state(&self) -> MongrateResult<Vec<StateEntry>> {
        let (records, scripts) = self.reconcile_inputs().await?;
        Ok(reconcile(&records, &scripts))
    }

    /// Apply every pending migration, in enumeration order, as one batch.
    ///
    /// Returns the records written for this invocation; an empty list means
    /// nothing was pending. On failure the scripts that succeeded before the
    /// abort point remain recorded (no compensating rollback) and the
    /// combined error names the script(s) that failed, so a later call
    /// resumes from the true remaining-pending set in a fresh batch.
    pub async fn migrate(&self) -> MongrateResult<Vec<ExecutionRecord>> {
        let (records, scripts) = self.reconcile_inputs().await?;
        let executed: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let pending: Vec<&ScriptDescriptor> =
            scripts.iter().filter(|d| !executed.contains(d.name.as_str())).collect();
        if pending.is_empty() {
            info!("nothing to migrate");
            return Ok(Vec::new());
        }

        // One timestamp for the whole invocation, fixed before anything runs.
        let batch = Utc::now().timestamp_millis();
        let db = self.connection.database().await?;

        let mut applied: Vec<ExecutionRecord> = Vec::new();
        let mut failures: Vec<ScriptFailure> = Vec::new();
        let mut load_error: Option<ScriptStoreError> = None;

        for descriptor in pending {
            let script = match self.scripts.load(descriptor).await {
                Ok(script) => script,
                Err(err) => {
                    // An unloadable script aborts the batch, but the
                    // successes before it still get recorded below.
                    load_error = Some(err);
                    break;
                }
            };
            info!(migration = %descriptor.name, "applying migration");
            match script.up(&db).await {
                Ok(()) => applied.push(ExecutionRecord::new(&descriptor.name, batch)),
                Err(source) => {
                    error!(migration = %descriptor.name, error = %source, "migration failed");
                    failures.push(ScriptFailure {
                        script: descriptor.name.clone(),
                        direction: Direction::Up,
                        source,
                    });
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        // Everything that succeeded before the abort point is persisted as a
        // single batch, even when the invocation as a whole fails.
        if !applied.is_empty() {
            self.state.insert_many(&applied).await?;
        }
        if let Some(err) = load_error {
            return Err(err.into());
        }
        if !failures.is_empty() {
            return Err(ExecutionError::new(failures).into());
        }
        info!(count = applied.len(), batch, "migration batch complete");
        Ok(applied)
    }

    /// Invert the most recent batch (`all = false`) or every executed
    /// migration (`all = true`), returning the names actually rolled back.
    ///
    /// Each record is deleted if and only if its `down` completed without
    /// error; deletions performed before a failure are final.
    pub async fn rollback(&self, all: bool) -> MongrateResult<Vec<String>> {
        let (records, scripts) = self.reconcile_inputs().await?;
        if records.is_empty() {
            info!("nothing to roll back");
            return Ok(Vec::new());
        }
        let candidates: Vec<&ExecutionRecord> = if all {
            records.iter().collect()
        } else {
            let latest = records[0].executed_on;
            records.iter().filter(|r| r.executed_on == latest).collect()
        };

        // Candidates run in script enumeration order, not batch order.
        let index: HashMap<&str, usize> =
            scripts.iter().enumerate().map(|(i, d)| (d.name.as_str(), i)).collect();
        let mut ordered = Vec::with_capacity(candidates.len());
        for record in candidates {
            match index.get(record.name.as_str()) {
                Some(&i) => ordered.push((i, record)),
                // Refuse to touch the state record of a script we cannot
                // invert.
                None => return Err(ScriptStoreError::MissingScript(record.name.clone()).into()),
            }
        }
        ordered.sort_by_key(|(i, _)| *i);

        let db = self.connection.database().await?;
        let mut reverted: Vec<String> = Vec::new();
        let mut failures: Vec<ScriptFailure> = Vec::new();

        for (i, record) in ordered {
            let script = self.scripts.load(&scripts[i]).await?;
            info!(migration = %record.name, "rolling back migration");
            match script.down(&db).await {
                Ok(()) => {
                    // Deleted if and only if `down` completed without error.
                    self.state.delete_by_names(std::slice::from_ref(&record.name)).await?;
                    reverted.push(record.name.clone());
                }
                Err(source) => {
                    error!(migration = %record.name, error = %source, "rollback failed");
                    failures.push(ScriptFailure {
                        script: record.name.clone(),
                        direction: Direction::Down,
                        source,
                    });
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(ExecutionError::new(failures).into());
        }
        info!(count = reverted.len(), "rollback complete");
        Ok(reverted)
    }

    /// Run every seeder in enumeration order, returning the names run.
    /// Seeders leave no trace in the state collection.
    pub async fn seed(&self) -> MongrateResult<Vec<String>> {
        let seeders = self.seeders.list_seeders().await?;
        if seeders.is_empty() {
            info!("nothing to seed");
            return Ok(Vec::new());
        }
        let db = self.connection.database().await?;

        let mut run: Vec<String> = Vec::new();
        let mut failures: Vec<ScriptFailure> = Vec::new();

        for descriptor in &seeders {
            let seeder = self.seeders.load(descriptor).await?;
            info!(seeder = %descriptor.name, "running seeder");
            match seeder.run(&db).await {
                Ok(()) => run.push(descriptor.name.clone()),
                Err(source) => {
                    error!(seeder = %descriptor.name, error = %source, "seeder failed");
                    failures.push(ScriptFailure {
                        script: descriptor.name.clone(),
                        direction: Direction::Run,
                        source,
                    });
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(ExecutionError::new(failures).into());
        }
        Ok(run)
    }

    /// Release the database connection; later operations fail rather than
    /// reconnecting.
    pub async fn dispose(&self) -> MongrateResult<()> {
        self.connection.dispose().await?;
        Ok(())
    }

    async fn reconcile_inputs(
        &self,
    ) -> MongrateResult<(Vec<ExecutionRecord>, Vec<ScriptDescriptor>)> {
        let records = self.state.find_all().await?;
        let scripts = self.scripts.list_scripts().await?;
        Ok((records, scripts))
    }
}

fn reconcile(records: &[ExecutionRecord], scripts: &[ScriptDescriptor]) -> Vec<StateEntry> {
    let executed: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let mut view: Vec<StateEntry> = records.iter().map(StateEntry::executed).collect();
    view.extend(
        scripts
            .iter()
            .filter(|d| !executed.contains(d.name.as_str()))
            .map(|d| StateEntry::pending(&d.name)),
    );
    view
}
