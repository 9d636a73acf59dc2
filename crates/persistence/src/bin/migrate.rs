#![deny(warnings)]

//! Create the simulation database and apply migrations.

use anyhow::Context;
use clap::Parser;
use persistence::{ensure_parent_dir, SimulationStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "realty-migrate", version, about)]
struct Args {
    /// SQLite URL, e.g. sqlite://data/realty.db
    #[arg(long, env = "REALTY_DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    ensure_parent_dir(&args.database_url)
        .with_context(|| format!("creating directory for {}", args.database_url))?;
    let store = SimulationStore::connect(&args.database_url)
        .await
        .with_context(|| format!("migrating {}", args.database_url))?;
    store.close().await;
    info!(url = %args.database_url, "database migrated");
    Ok(())
}
