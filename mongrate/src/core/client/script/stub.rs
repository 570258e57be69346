use super::directory::SCRIPT_EXTENSION;
use crate::error::{MongrateError, MongrateResult};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Kind of stub file `create` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Migration,
    Seeder,
}

const MIGRATION_STUB: &str = r#"{
    "up": [],
    "down": []
}
"#;

const SEEDER_STUB: &str = r#"{
    "run": []
}
"#;

/// Create a timestamp-prefixed stub script in `dir`, creating the directory
/// if it does not exist yet. Returns the path of the new file.
pub async fn create_stub(dir: &Path, name: &str, kind: StubKind) -> MongrateResult<PathBuf> {
    validate_name(name)?;

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let file_name = format!(
        "{}_{}.{}",
        timestamp,
        name.to_lowercase().replace([' ', '-'], "_"),
        SCRIPT_EXTENSION
    );
    let path = dir.join(file_name);

    tokio::fs::create_dir_all(dir).await?;
    let template = match kind {
        StubKind::Migration => MIGRATION_STUB,
        StubKind::Seeder => SEEDER_STUB,
    };
    tokio::fs::write(&path, template).await?;
    info!(path = %path.display(), "created script stub");
    Ok(path)
}

/// Names may contain letters, digits, spaces, hyphens and underscores, and
/// must contain at least one letter so the logical name survives
/// timestamp-prefix stripping.
fn validate_name(name: &str) -> MongrateResult<()> {
    if name.is_empty() {
        return Err(MongrateError::Config("migration name cannot be empty".into()));
    }
    if name.len() > 100 {
        return Err(MongrateError::Config("migration name too long (max 100 characters)".into()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ' || c == '-')
    {
        return Err(MongrateError::Config(
            "migration name may only contain letters, digits, spaces, hyphens and underscores"
                .into(),
        ));
    }
    if !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(MongrateError::Config(
            "migration name must contain at least one letter".into(),
        ));
    }
    Ok(())
}
