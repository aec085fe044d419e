mod commands;
mod error;
mod pipeline;
mod snapshot;

use clap::{Parser, Subcommand};
use exn::ResultExt;
use seasync_config::Config;
use seasync_extract::Client;
use seasync_store::Database;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::commands::{Assignment, FetchArgs, TableArg};
use crate::error::{ErrorKind, Result};
use crate::pipeline::Pipeline;

/// Pull NFT collections from OpenSea into a local SQLite database.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to `seasync.toml` when present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, archive, transform and load collections (the default).
    Sync,
    /// Print matching rows as JSON.
    Fetch {
        #[command(flatten)]
        table: TableArg,
        #[command(flatten)]
        query: FetchArgs,
    },
    /// Insert one record (JSON object) or several (JSON array).
    Insert {
        #[command(flatten)]
        table: TableArg,
        record: String,
    },
    /// Set columns on every row matching the filters.
    Update {
        #[command(flatten)]
        table: TableArg,
        #[arg(short = 'w', long = "where", value_parser = commands::parse_assignment)]
        filters: Vec<Assignment>,
        #[arg(short = 's', long = "set", value_parser = commands::parse_assignment, required = true)]
        values: Vec<Assignment>,
    },
    /// Delete every row matching the filters.
    Delete {
        #[command(flatten)]
        table: TableArg,
        #[arg(short = 'w', long = "where", value_parser = commands::parse_assignment)]
        filters: Vec<Assignment>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing `.env` is fine; real environment variables still apply.
    _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(retryable = err.is_retryable(), "{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(parent) = config.database.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Store)?;
    }
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Store)?;
    let result = dispatch(cli.command.unwrap_or(Commands::Sync), &config, &db).await;
    db.close().await;
    result
}

async fn dispatch(command: Commands, config: &Config, db: &Database) -> Result<()> {
    match command {
        Commands::Sync => {
            let client = Client::with_timeout(
                config.api_key().map(String::from),
                config.endpoint.clone(),
                config.timeout(),
            )
            .or_raise(|| ErrorKind::Extract)?;
            if config.api_key().is_none() {
                tracing::warn!("No API key configured; the request will most likely be rejected");
            }
            let pipeline = Pipeline::new(client, db.collections(), config.chain.clone(), config.snapshot.clone());
            pipeline.run().await;
        },
        Commands::Fetch { table, query } => {
            let rows = commands::fetch(db, &table.table, query).await?;
            let json = serde_json::to_string_pretty(&rows)
                .or_raise(|| ErrorKind::Argument("rows could not be serialized".to_string()))?;
            println!("{json}");
        },
        Commands::Insert { table, record } => {
            let records = commands::parse_records(&record)?;
            let inserted = commands::insert(db, &table.table, records).await?;
            tracing::info!(table = %table.table, inserted, "Inserted records");
        },
        Commands::Update { table, filters, values } => {
            let updated = commands::update(db, &table.table, filters, &values).await?;
            tracing::info!(table = %table.table, updated, "Updated records");
        },
        Commands::Delete { table, filters } => {
            let deleted = commands::delete(db, &table.table, filters).await?;
            tracing::info!(table = %table.table, deleted, "Deleted records");
        },
    }
    Ok(())
}
