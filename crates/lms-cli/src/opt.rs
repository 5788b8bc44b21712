use clap::{Args, Parser, Subcommand};
use lms_db::store::StoreConfig;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "lms", about = "Inspect a learning management database")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) db: Db,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Create the tables.
    Init,
    /// Create the tables and insert the sample data set.
    Seed,
    /// Print joins, aggregates and eager loaded listings.
    Report(Report),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Db {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    pub(crate) db_url: String,

    #[arg(long, env = "LMS_DB_MIN_CONNECTIONS", help = "Min connections")]
    pub(crate) db_min_connections: Option<u32>,

    #[arg(long, env = "LMS_DB_MAX_CONNECTIONS", help = "Max connections")]
    pub(crate) db_max_connections: Option<u32>,

    #[arg(long, help = "Seconds to wait for a pooled connection")]
    pub(crate) db_acquire_timeout: Option<u64>,

    #[arg(long, help = "Log every SQL statement")]
    pub(crate) sql_logging: bool,
}

impl Db {
    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            min_connections: self.db_min_connections,
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout.map(Duration::from_secs),
            sqlx_logging: self.sql_logging,
            ..StoreConfig::new(self.db_url.clone())
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Report {
    /// Create and seed the tables first, for in-memory databases.
    #[arg(long)]
    pub(crate) seed: bool,

    #[arg(long, default_value_t = 4, help = "Minimum rating of highly rated submissions")]
    pub(crate) min_rating: i32,
}
