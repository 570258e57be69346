use crate::core::client::database::DatabaseError;
use crate::core::client::script::ScriptStoreError;
use crate::core::engine::error::ExecutionError;
use thiserror::Error;

/// Result type for engine operations
pub type MongrateResult<T> = Result<T, MongrateError>;

/// Top-level error for everything the engine surfaces to its caller.
#[derive(Error, Debug)]
pub enum MongrateError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Script discovery or loading failed
    #[error("Script store error: {0}")]
    ScriptStore(#[from] ScriptStoreError),

    /// State collection read/write failed
    #[error("State store error: {0}")]
    Database(#[from] DatabaseError),

    /// One or more script units failed
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration file error
    #[error("Config file error: {0}")]
    ConfigFile(#[from] serde_yaml::Error),
}
