use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gator::commands::{self, Command, CommandError, Session};
use gator::config::Config;
use gator::db::{Database, DirMigrations, EmbeddedMigrations, MigrationSource};
use gator::feed::FeedFetcher;

const MIGRATIONS_DIR_ENV: &str = "GATOR_MIGRATIONS_DIR";

#[derive(Parser)]
#[command(name = "gator", version)]
#[command(about = "Command-line RSS aggregator")]
struct Cli {
    /// Command to run (login, register, reset, users, agg, addfeed, feeds, follow, following, unfollow)
    command: Option<String>,

    /// Arguments passed to the command as-is
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// Initialize tracing on stderr so stdout carries command output only
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "gator=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn migration_source() -> Box<dyn MigrationSource> {
    match std::env::var(MIGRATIONS_DIR_ENV) {
        Ok(dir) => {
            tracing::debug!("Using migrations from {}", dir);
            Box::new(DirMigrations::new(dir))
        }
        Err(_) => Box::new(EmbeddedMigrations),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Database> {
    let db = if config.db_url.is_empty() {
        Database::open_default()
    } else {
        Database::open(&config.db_url)
    }
    .context("Failed to open database")?;
    Ok(db)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(name) = cli.command else {
        anyhow::bail!("No command provided");
    };

    let config = Config::load_default()?;
    let db = open_store(&config)?;
    let migrations = migration_source();
    db.bootstrap(migrations.as_ref())
        .context("Failed to apply schema")?;

    let registry = commands::registry(FeedFetcher::new(), migrations);
    let mut session = Session::new(config, Arc::new(db));
    let command = Command::new(name, cli.args);

    match registry.run(&mut session, &command).await {
        Err(CommandError::UnknownCommand(name)) => {
            tracing::info!("Available commands: {}", registry.names().join(", "));
            Err(CommandError::UnknownCommand(name).into())
        }
        other => Ok(other?),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error running command: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
