#![deny(warnings)]

//! Persistence layer: SQLite store for simulation records.
//!
//! A record holds one input snapshot plus the results the pricing engine
//! computed from it. Results are recomputed on every create or update and are
//! never edited directly. Every operation is scoped by an opaque owner id; a
//! record belonging to another owner is reported as not found.

use chrono::{DateTime, SecondsFormat, Utc};
use realty_core::{SimulationInput, ValidationError};
use realty_pricing::SimulationResults;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

pub mod stats;

pub use stats::{SimulationStats, StatRow};

/// Errors produced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid simulation: {0}")]
    Invalid(#[from] ValidationError),
    #[error("simulation {0} not found")]
    NotFound(i64),
    /// A stored value could not be decoded.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Review status of a stored simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    Draft,
    Validated,
    Archived,
}

impl SimulationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SimulationStatus::Draft => "draft",
            SimulationStatus::Validated => "validated",
            SimulationStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(SimulationStatus::Draft),
            "validated" => Ok(SimulationStatus::Validated),
            "archived" => Ok(SimulationStatus::Archived),
            other => Err(format!("unknown simulation status: {other}")),
        }
    }
}

/// A stored simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub id: i64,
    pub owner: String,
    pub status: SimulationStatus,
    pub notes: Option<String>,
    pub input: SimulationInput,
    pub results: SimulationResults,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SimulationRecord {
    /// Project name of the stored snapshot.
    pub fn name(&self) -> &str {
        &self.input.project.name
    }
}

/// Listing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    NameAsc,
}

impl SortOrder {
    fn clause(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "created_at DESC, id DESC",
            SortOrder::OldestFirst => "created_at ASC, id ASC",
            SortOrder::NameAsc => "name COLLATE NOCASE ASC, id ASC",
        }
    }
}

/// Page size used when a query asks for zero items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination, filter and order for [`SimulationStore::list`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number; 0 is read as 1.
    pub page: u32,
    pub limit: u32,
    pub status: Option<SimulationStatus>,
    pub sort: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            status: None,
            sort: SortOrder::default(),
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching records over all pages.
    pub total_count: u64,
    pub page: u32,
    pub total_pages: u64,
}

#[derive(FromRow)]
struct SimulationRow {
    id: i64,
    owner: String,
    status: String,
    notes: Option<String>,
    input_json: String,
    results_json: String,
    created_at: String,
    updated_at: String,
}

#[derive(FromRow)]
struct StatsRow {
    id: i64,
    status: String,
    investment: String,
    revenue: String,
    roi_pct: String,
}

fn corrupt(id: i64, reason: impl fmt::Display) -> StoreError {
    StoreError::Corrupt {
        id,
        reason: reason.to_string(),
    }
}

fn parse_status(id: i64, s: &str) -> Result<SimulationStatus, StoreError> {
    s.parse().map_err(|e: String| corrupt(id, e))
}

fn parse_decimal(id: i64, s: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(s).map_err(|e| corrupt(id, e))
}

fn parse_time(id: i64, s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(id, e))
}

fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SimulationRow {
    fn into_record(self) -> Result<SimulationRecord, StoreError> {
        let id = self.id;
        Ok(SimulationRecord {
            id,
            owner: self.owner,
            status: parse_status(id, &self.status)?,
            notes: self.notes,
            input: serde_json::from_str(&self.input_json)?,
            results: serde_json::from_str(&self.results_json)?,
            created_at: parse_time(id, &self.created_at)?,
            updated_at: parse_time(id, &self.updated_at)?,
        })
    }
}

impl StatsRow {
    fn into_stat(self) -> Result<StatRow, StoreError> {
        Ok(StatRow {
            status: parse_status(self.id, &self.status)?,
            investment: parse_decimal(self.id, &self.investment)?,
            revenue: parse_decimal(self.id, &self.revenue)?,
            roi_pct: parse_decimal(self.id, &self.roi_pct)?,
        })
    }
}

/// Blank notes are stored as NULL.
fn non_blank(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

/// Validate and price `input`. The engine is the only source of results.
fn price(input: &SimulationInput) -> Result<SimulationResults, StoreError> {
    Ok(realty_pricing::compute_checked(input)?)
}

/// SQLite-backed simulation store.
#[derive(Debug, Clone)]
pub struct SimulationStore {
    pool: SqlitePool,
}

impl SimulationStore {
    /// Open (creating if missing) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!(%url, "opening simulation store");
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database. A single connection that never expires
    /// keeps the data alive for the store's lifetime.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        debug!("running migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert(
        &self,
        owner: &str,
        status: SimulationStatus,
        notes: Option<String>,
        input: &SimulationInput,
    ) -> Result<SimulationRecord, StoreError> {
        let results = price(input)?;
        let now = format_time(Utc::now());
        let id = sqlx::query(
            r#"
            INSERT INTO simulations
                (owner, name, location, status, notes, input_json, results_json,
                 investment, revenue, roi_pct, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner)
        .bind(&input.project.name)
        .bind(&input.project.location)
        .bind(status.as_str())
        .bind(&notes)
        .bind(serde_json::to_string(input)?)
        .bind(serde_json::to_string(&results)?)
        .bind(results.investment.to_string())
        .bind(results.headline.revenue.to_string())
        .bind(results.headline.roi_pct.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        info!(id, owner, name = %input.project.name, "simulation created");
        self.get(owner, id).await
    }

    /// Validate, price and store a new draft simulation.
    pub async fn create(
        &self,
        owner: &str,
        input: &SimulationInput,
        notes: Option<String>,
    ) -> Result<SimulationRecord, StoreError> {
        self.insert(owner, SimulationStatus::Draft, non_blank(notes), input)
            .await
    }

    /// Fetch one simulation.
    pub async fn get(&self, owner: &str, id: i64) -> Result<SimulationRecord, StoreError> {
        sqlx::query_as::<_, SimulationRow>(
            "SELECT id, owner, status, notes, input_json, results_json, created_at, updated_at
             FROM simulations WHERE id = ? AND owner = ?",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?
        .into_record()
    }

    /// One page of the owner's simulations.
    pub async fn list(
        &self,
        owner: &str,
        query: &ListQuery,
    ) -> Result<Page<SimulationRecord>, StoreError> {
        let page = query.page.max(1);
        let limit = if query.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            query.limit
        };
        let status = query.status.map(SimulationStatus::as_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM simulations WHERE owner = ?1 AND (?2 IS NULL OR status = ?2)",
        )
        .bind(owner)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT id, owner, status, notes, input_json, results_json, created_at, updated_at
             FROM simulations WHERE owner = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY {} LIMIT ?3 OFFSET ?4",
            query.sort.clause()
        );
        let rows = sqlx::query_as::<_, SimulationRow>(&sql)
            .bind(owner)
            .bind(status)
            .bind(i64::from(limit))
            .bind((i64::from(page) - 1) * i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        let items = rows
            .into_iter()
            .map(SimulationRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        let total_count = u64::try_from(total).unwrap_or(0);
        Ok(Page {
            items,
            total_count,
            page,
            total_pages: total_count.div_ceil(u64::from(limit)),
        })
    }

    /// Replace the input snapshot, recompute results and bump `updated_at`.
    /// `notes` replaces the stored notes when given; blank notes clear them.
    pub async fn update(
        &self,
        owner: &str,
        id: i64,
        input: &SimulationInput,
        notes: Option<String>,
    ) -> Result<SimulationRecord, StoreError> {
        let results = price(input)?;
        let done = sqlx::query(
            r#"
            UPDATE simulations SET
                name = ?, location = ?, notes = CASE WHEN ? THEN ? ELSE notes END,
                input_json = ?, results_json = ?,
                investment = ?, revenue = ?, roi_pct = ?, updated_at = ?
            WHERE id = ? AND owner = ?
            "#,
        )
        .bind(&input.project.name)
        .bind(&input.project.location)
        .bind(notes.is_some())
        .bind(non_blank(notes))
        .bind(serde_json::to_string(input)?)
        .bind(serde_json::to_string(&results)?)
        .bind(results.investment.to_string())
        .bind(results.headline.revenue.to_string())
        .bind(results.headline.roi_pct.to_string())
        .bind(format_time(Utc::now()))
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!(id, owner, "simulation updated");
        self.get(owner, id).await
    }

    pub async fn delete(&self, owner: &str, id: i64) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM simulations WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!(id, owner, "simulation deleted");
        Ok(())
    }

    /// Copy a simulation as a new draft named "<name> (copy)".
    pub async fn duplicate(&self, owner: &str, id: i64) -> Result<SimulationRecord, StoreError> {
        let source = self.get(owner, id).await?;
        let mut input = source.input;
        input.project.name = format!("{} (copy)", input.project.name);
        debug!(from = id, "duplicating simulation");
        self.insert(owner, SimulationStatus::Draft, source.notes, &input)
            .await
    }

    pub async fn set_status(
        &self,
        owner: &str,
        id: i64,
        status: SimulationStatus,
    ) -> Result<SimulationRecord, StoreError> {
        let done = sqlx::query(
            "UPDATE simulations SET status = ?, updated_at = ? WHERE id = ? AND owner = ?",
        )
        .bind(status.as_str())
        .bind(format_time(Utc::now()))
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!(id, owner, %status, "simulation status changed");
        self.get(owner, id).await
    }

    /// Aggregate statistics over all of the owner's simulations.
    pub async fn stats(&self, owner: &str) -> Result<SimulationStats, StoreError> {
        let rows = sqlx::query_as::<_, StatsRow>(
            "SELECT id, status, investment, revenue, roi_pct FROM simulations WHERE owner = ?",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        let rows = rows
            .into_iter()
            .map(StatsRow::into_stat)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SimulationStats::fold(rows))
    }
}

/// Make sure the parent directory of a file-backed SQLite URL exists.
pub fn ensure_parent_dir(url: &str) -> std::io::Result<()> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .map(|p| p.split('?').next().unwrap_or(p));
    if let Some(path) = path.filter(|p| !p.is_empty() && !p.starts_with(":memory:")) {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
