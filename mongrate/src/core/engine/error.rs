use crate::core::client::script::Direction;
use std::fmt;

/// A single script unit failure, wrapped together with its originating
/// cause.
#[derive(Debug, thiserror::Error)]
#[error("script '{script}' failed during {direction}: {source}")]
pub struct ScriptFailure {
    pub script: String,
    pub direction: Direction,
    #[source]
    pub source: anyhow::Error,
}

/// Combined failure for one `migrate`/`rollback`/`seed` invocation.
///
/// Under the fail-fast policy this carries exactly one failure; under
/// best-effort continuation it carries every script that failed.
#[derive(Debug)]
pub struct ExecutionError {
    pub failures: Vec<ScriptFailure>,
}

impl ExecutionError {
    pub fn new(failures: Vec<ScriptFailure>) -> Self {
        Self { failures }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [single] => write!(f, "{single}"),
            failures => {
                let names: Vec<&str> = failures.iter().map(|e| e.script.as_str()).collect();
                write!(f, "{} migration scripts failed: {}", failures.len(), names.join(", "))
            }
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.first().map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}
