use super::Direction;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptStoreError {
    /// The scripts directory is missing or cannot be enumerated.
    #[error("cannot read scripts directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The filename does not yield a usable logical name.
    #[error("cannot resolve a migration name from {0}")]
    InvalidName(PathBuf),

    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid command script.
    #[error("failed to parse script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A command entry did not serialize to a BSON document.
    #[error("script '{name}' contains a non-document {direction} command at index {index}")]
    InvalidCommand {
        name: String,
        direction: Direction,
        index: usize,
    },

    /// No handler is registered under this name.
    #[error("no migration named '{0}' is registered")]
    NotRegistered(String),

    /// A persisted record refers to a script the store no longer knows.
    #[error("no script found for executed migration '{0}'")]
    MissingScript(String),
}
