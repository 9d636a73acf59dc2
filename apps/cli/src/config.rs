//! Process-wide configuration, resolved once at startup.

use anyhow::{anyhow, Result};
use clap::Args;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// SQLite URL of the simulation store, e.g. sqlite://data/realty.db
    #[arg(long, env = "REALTY_DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Database URL, required by the `db` commands.
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow!("no database configured: pass --database-url or set REALTY_DATABASE_URL")
            })
    }
}
