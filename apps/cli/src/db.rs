//! `realty db ...`: manage stored simulations.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use persistence::{ListQuery, SimulationRecord, SimulationStatus, SimulationStore, SortOrder};
use realty_core::{apply, FieldChange};
use std::path::PathBuf;

use crate::report::{money, pct, Report};
use crate::scenario;

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Owner id the records are scoped to
    #[arg(long, env = "REALTY_OWNER", default_value = "local")]
    pub owner: String,

    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortArg {
    #[default]
    Newest,
    Oldest,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Newest => SortOrder::NewestFirst,
            SortArg::Oldest => SortOrder::OldestFirst,
            SortArg::Name => SortOrder::NameAsc,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DbCommand {
    /// Price a scenario file and store it as a draft
    Create {
        /// Scenario file (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Print one simulation
    Show {
        id: i64,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List simulations, newest first by default
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = persistence::DEFAULT_PAGE_SIZE)]
        limit: u32,
        /// Only records with this status (draft, validated, archived)
        #[arg(long)]
        status: Option<SimulationStatus>,
        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
    },

    /// Replace or edit the input of a simulation and recompute it
    Update {
        id: i64,
        /// New scenario file; the stored input is used when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Field change as JSON, e.g. '{"field":"vat_pct","value":"18"}'. Repeatable
        #[arg(long = "change")]
        changes: Vec<String>,
        /// New notes; an empty value clears them
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a simulation
    Delete { id: i64 },

    /// Copy a simulation as a new draft
    Duplicate { id: i64 },

    /// Set the review status of a simulation
    Status { id: i64, status: SimulationStatus },

    /// Aggregate figures over all simulations
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn summary(rec: &SimulationRecord) -> String {
    format!(
        "#{} {} [{}] investment {} revenue {} ROI {}% (updated {})",
        rec.id,
        rec.name(),
        rec.status,
        money(rec.results.investment),
        money(rec.results.headline.revenue),
        pct(rec.results.headline.roi_pct),
        rec.updated_at.format("%Y-%m-%d %H:%M")
    )
}

/// Parse and apply `--change` arguments in order.
pub fn apply_changes(
    mut input: realty_core::SimulationInput,
    changes: &[String],
) -> Result<realty_core::SimulationInput> {
    for raw in changes {
        let change: FieldChange =
            serde_json::from_str(raw).with_context(|| format!("invalid change {raw}"))?;
        input = apply(&input, change)?;
    }
    Ok(input)
}

pub async fn run_db_command(store: &SimulationStore, owner: &str, cmd: DbCommand) -> Result<()> {
    match cmd {
        DbCommand::Create { input, notes } => {
            let input = scenario::load(&input)?;
            let rec = store.create(owner, &input, notes).await?;
            println!("created {}", summary(&rec));
        }
        DbCommand::Show { id, json } => {
            let rec = store.get(owner, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                println!("{}", summary(&rec));
                if let Some(notes) = &rec.notes {
                    println!("notes: {notes}");
                }
                println!(
                    "{}",
                    Report {
                        input: &rec.input,
                        results: &rec.results,
                    }
                );
            }
        }
        DbCommand::List {
            page,
            limit,
            status,
            sort,
        } => {
            let query = ListQuery {
                page,
                limit,
                status,
                sort: sort.into(),
            };
            let page = store.list(owner, &query).await?;
            for rec in &page.items {
                println!("{}", summary(rec));
            }
            println!(
                "page {}/{} ({} simulations)",
                page.page,
                page.total_pages.max(1),
                page.total_count
            );
        }
        DbCommand::Update {
            id,
            input,
            changes,
            notes,
        } => {
            if input.is_none() && changes.is_empty() && notes.is_none() {
                bail!("nothing to update: pass --input, --change or --notes");
            }
            let base = match input {
                Some(path) => scenario::load(&path)?,
                None => store.get(owner, id).await?.input,
            };
            let next = apply_changes(base, &changes)?;
            let rec = store.update(owner, id, &next, notes).await?;
            println!("updated {}", summary(&rec));
        }
        DbCommand::Delete { id } => {
            store.delete(owner, id).await?;
            println!("deleted #{id}");
        }
        DbCommand::Duplicate { id } => {
            let rec = store.duplicate(owner, id).await?;
            println!("created {}", summary(&rec));
        }
        DbCommand::Status { id, status } => {
            let rec = store.set_status(owner, id, status).await?;
            println!("{}", summary(&rec));
        }
        DbCommand::Stats { json } => {
            let stats = store.stats(owner).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("simulations: {}", stats.total_simulations);
                println!("total investment: {}", money(stats.total_investment));
                println!("total revenue: {}", money(stats.total_revenue));
                println!(
                    "ROI avg {}% | min {}% | max {}%",
                    pct(stats.average_roi_pct),
                    pct(stats.min_roi_pct),
                    pct(stats.max_roi_pct)
                );
                for (status, count) in &stats.by_status {
                    println!("  {status}: {count}");
                }
            }
        }
    }
    Ok(())
}
