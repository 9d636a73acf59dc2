#![deny(warnings)]

//! `realty`: price development scenarios and manage stored simulations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use persistence::{ensure_parent_dir, SimulationStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod report;
mod scenario;

use config::AppConfig;
use db::DbArgs;
use report::Report;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "realty", version = VERSION, about)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute and print the results of a scenario file
    Compute {
        /// Scenario file (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,
        /// Print the raw results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in demo scenario as YAML
    Demo,

    /// Manage stored simulations
    Db(DbArgs),
}

fn compute(input: PathBuf, json: bool) -> Result<()> {
    let input = scenario::load(&input)?;
    let results = realty_pricing::compute_checked(&input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", Report { input: &input, results: &results });
    }
    Ok(())
}

async fn db(config: &AppConfig, args: DbArgs) -> Result<()> {
    let url = config.database_url()?;
    ensure_parent_dir(url)?;
    let store = SimulationStore::connect(url).await?;
    let outcome = db::run_db_command(&store, &args.owner, args.command).await;
    store.close().await;
    outcome
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(version = VERSION, "starting realty");

    match cli.command {
        Command::Compute { input, json } => compute(input, json),
        Command::Demo => {
            print!("{}", serde_yaml::to_string(&realty_core::demo_input())?);
            Ok(())
        }
        Command::Db(args) => db(&cli.config, args).await,
    }
}
