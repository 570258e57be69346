use clap::Parser as _;
use dotenvy::dotenv;
use mongrate::cli::{output, Cli, Commands};
use mongrate::config::MigratorConfig;
use mongrate::core::client::script::stub::{create_stub, StubKind};
use mongrate::utils::logging::init_logging;
use mongrate::{Migrator, MongrateResult};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    if let Err(error) = run(&cli).await {
        output::print_error(&error);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> MongrateResult<()> {
    let config = MigratorConfig::resolve(cli).await?;

    // `create` only touches the filesystem; no engine, no connection.
    if let Commands::Create { name, seeder } = &cli.command {
        let (kind, dir, label) = if *seeder {
            (StubKind::Seeder, &config.seeders_dir, "seeder")
        } else {
            (StubKind::Migration, &config.migrations_dir, "migration")
        };
        let path = create_stub(dir, name, kind).await?;
        output::print_created(label, name, &path);
        return Ok(());
    }

    let migrator = Migrator::from_config(&config)?;
    let outcome = match &cli.command {
        Commands::State { pending, executed } => migrator
            .state()
            .await
            .map(|entries| output::print_state(&entries, *pending, *executed)),
        Commands::Migrate => migrator.migrate().await.map(|records| output::print_migrated(&records)),
        Commands::Rollback { all } => {
            migrator.rollback(*all).await.map(|names| output::print_rolled_back(&names))
        }
        Commands::Seed => migrator.seed().await.map(|names| output::print_seeded(&names)),
        // Handled above.
        Commands::Create { .. } => Ok(()),
    };

    // The connection is released whether the operation succeeded or not.
    let disposed = migrator.dispose().await;
    outcome?;
    disposed
}
