use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod database;
pub mod output;

pub use database::MongoDbArgs;

#[derive(Parser, Debug)]
#[command(
    name = "mongrate",
    version,
    about = "MongoDB migration runner",
    long_about = "Reconciles migration scripts on disk against the persisted execution record \
    and applies them forward (migrate) or backward (rollback) in deterministic, batch-aware order.",
    after_help = "Examples:\n  \
    mongrate create add_user_index\n  \
    mongrate state --pending\n  \
    mongrate migrate --mongodb-host localhost --mongodb-db app\n  \
    mongrate rollback --all --config mongrate.yaml"
)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, value_name = "PATH", env = "MONGRATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub mongodb_args: MongoDbArgs,

    /// Name of the collection that stores migration state
    #[arg(long, global = true, value_name = "NAME", env = "MONGRATE_STATE_COLLECTION")]
    pub state_collection: Option<String>,

    /// Directory containing migration scripts
    #[arg(long, global = true, value_name = "DIR", env = "MONGRATE_MIGRATIONS_DIR")]
    pub migrations_dir: Option<PathBuf>,

    /// Directory containing seeder scripts
    #[arg(long, global = true, value_name = "DIR", env = "MONGRATE_SEEDERS_DIR")]
    pub seeders_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a migration script stub
    Create {
        /// Name of the new migration
        name: String,

        /// Create a seeder stub instead of a migration
        #[arg(long)]
        seeder: bool,
    },
    /// Show the status of all the migrations
    State {
        /// Show only the pending migrations
        #[arg(long)]
        pending: bool,

        /// Show only the executed migrations
        #[arg(long)]
        executed: bool,
    },
    /// Execute the pending migrations as one batch
    Migrate,
    /// Roll back the last batch of migrations
    Rollback {
        /// Roll back all of the migrations
        #[arg(short, long)]
        all: bool,
    },
    /// Run the seeders
    Seed,
}
