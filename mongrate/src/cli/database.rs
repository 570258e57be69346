use clap::Args;

/// MongoDB connection parameters.
///
/// A full connection URL wins over the individual parts.
#[derive(Debug, Clone, Args)]
pub struct MongoDbArgs {
    /// Full MongoDB connection URL
    #[arg(long, global = true, value_name = "URL", env = "MONGRATE_MONGODB_URL")]
    pub mongodb_url: Option<String>,

    /// Database server host
    #[arg(long, global = true, value_name = "HOST", env = "MONGRATE_MONGODB_HOST")]
    pub mongodb_host: Option<String>,

    /// Database server port
    #[arg(long, global = true, value_name = "PORT", env = "MONGRATE_MONGODB_PORT")]
    pub mongodb_port: Option<u16>,

    /// Database user
    #[arg(long, global = true, value_name = "USER", env = "MONGRATE_MONGODB_USER")]
    pub mongodb_user: Option<String>,

    /// Database password
    #[arg(long, global = true, value_name = "PASSWORD", env = "MONGRATE_MONGODB_PASSWORD")]
    pub mongodb_password: Option<String>,

    /// Database name
    #[arg(long, global = true, value_name = "DB", env = "MONGRATE_MONGODB_DB")]
    pub mongodb_db: Option<String>,
}
