use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a migration as reported by reconciliation.
///
/// Only `Executed` is ever persisted; `Pending` is derived from the on-disk
/// script set and never written to the state collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationStatus {
    Executed,
    Pending,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Executed => write!(f, "EXECUTED"),
            MigrationStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// Persisted record of one executed migration.
///
/// Document shape: `{name, status: "EXECUTED", executedOn: <ms since epoch>}`.
/// Every record written by the same `migrate` invocation carries the same
/// `executedOn` value; that shared value is what groups records into a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub name: String,
    pub status: MigrationStatus,
    #[serde(rename = "executedOn")]
    pub executed_on: i64,
}

impl ExecutionRecord {
    pub fn new(name: impl Into<String>, executed_on: i64) -> Self {
        Self { name: name.into(), status: MigrationStatus::Executed, executed_on }
    }
}

/// One row of the reconciled state view: all persisted records (most recent
/// batch first) followed by the discovered scripts without a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateEntry {
    pub name: String,
    pub status: MigrationStatus,
    #[serde(rename = "executedOn", skip_serializing_if = "Option::is_none")]
    pub executed_on: Option<i64>,
}

impl StateEntry {
    pub fn executed(record: &ExecutionRecord) -> Self {
        Self {
            name: record.name.clone(),
            status: MigrationStatus::Executed,
            executed_on: Some(record.executed_on),
        }
    }

    pub fn pending(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: MigrationStatus::Pending, executed_on: None }
    }
}
