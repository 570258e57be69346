use crate::cli::Cli;
use crate::core::client::database::constant::DEFAULT_STATE_COLLECTION;
use crate::error::{MongrateError, MongrateResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default directory scanned for migration scripts.
pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

/// Default directory scanned for seeder scripts.
pub const DEFAULT_SEEDERS_DIR: &str = "./seeders";

/// Fully resolved engine configuration: CLI flags win over the config file,
/// which wins over the defaults.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    pub database: DatabaseParams,
    pub collection_name: String,
    pub migrations_dir: PathBuf,
    pub seeders_dir: PathBuf,
}

impl MigratorConfig {
    pub async fn resolve(cli: &Cli) -> MongrateResult<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path).await?,
            None => ConfigFile::default(),
        };

        let mongo = &cli.mongodb_args;
        let database = DatabaseParams {
            url: mongo.mongodb_url.clone().or(file.database.url),
            user: mongo.mongodb_user.clone().or(file.database.user),
            password: mongo.mongodb_password.clone().or(file.database.password),
            host: mongo.mongodb_host.clone().or(file.database.host),
            port: mongo.mongodb_port.or(file.database.port),
            db: mongo.mongodb_db.clone().or(file.database.db),
        };

        let collection_name = cli
            .state_collection
            .clone()
            .or(file.collection_name)
            .unwrap_or_else(|| DEFAULT_STATE_COLLECTION.to_string());
        validate_collection_name(&collection_name)?;

        let migrations_dir = cli
            .migrations_dir
            .clone()
            .or(file.migrations_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR));
        let seeders_dir = cli
            .seeders_dir
            .clone()
            .or(file.seeders_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEDERS_DIR));

        debug!(
            collection = %collection_name,
            migrations_dir = %migrations_dir.display(),
            "configuration resolved"
        );
        Ok(Self { database, collection_name, migrations_dir, seeders_dir })
    }
}

/// MongoDB connection parameters, either a full `url` or the individual
/// parts a connection string is assembled from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseParams {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<String>,
}

impl DatabaseParams {
    /// Build the connection string: an explicit `url` wins, otherwise
    /// `mongodb://[user:password@]host[:port][/db]`.
    pub fn connection_uri(&self) -> MongrateResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        let host = self.host.as_deref().ok_or_else(|| {
            MongrateError::Config(
                "a host must be specified to establish a database connection".into(),
            )
        })?;

        let mut uri = String::from("mongodb://");
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            uri.push_str(&format!("{user}:{password}@"));
        }
        uri.push_str(host);
        if let Some(port) = self.port {
            uri.push_str(&format!(":{port}"));
        }
        if let Some(db) = &self.db {
            uri.push_str(&format!("/{db}"));
        }
        Ok(uri)
    }

    /// Name of the database the engine operates on: the `db` parameter, or
    /// the path component of an explicit `url`.
    pub fn database_name(&self) -> MongrateResult<String> {
        if let Some(db) = &self.db {
            return Ok(db.clone());
        }
        if let Some(url) = &self.url {
            let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
            if let Some((_, path)) = after_scheme.split_once('/') {
                let name = path.split('?').next().unwrap_or("");
                if !name.is_empty() {
                    return Ok(name.to_string());
                }
            }
        }
        Err(MongrateError::Config("a database name must be specified".into()))
    }
}

/// Optional YAML configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseParams,
    pub collection_name: Option<String>,
    pub migrations_dir: Option<PathBuf>,
    pub seeders_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub async fn load(path: &Path) -> MongrateResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| {
            MongrateError::Config(format!(
                "cannot read config file {}: {source}",
                path.display()
            ))
        })?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

/// Collection names must be ASCII alphanumeric and contain at least one
/// letter; the state collection shares a database with user collections.
pub(crate) fn validate_collection_name(name: &str) -> MongrateResult<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric())
        && name.chars().any(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(())
    } else {
        Err(MongrateError::Config(format!("'{name}' is not a valid state collection name")))
    }
}
