use clap::{Parser, Subcommand};
use std::path::PathBuf;
use time::macros::{format_description, time};
use time::{Date, OffsetDateTime};

/// Aggregates pinball table databases into a single browsable index.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (defaults to the platform config folder).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every source that is due.
    Refresh,
    /// Load the index, rebuilding it if needed.
    Index {
        /// Rebuild from the downloaded sources even if a cached index exists.
        #[arg(long)]
        rebuild: bool,
    },
    /// Print the tag vocabulary.
    Tags,
    /// Filter the index.
    Search {
        text: Option<String>,
        /// Required tag; may be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Updated on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = start_of_day)]
        since: Option<OffsetDateTime>,
        /// Updated on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = end_of_day)]
        until: Option<OffsetDateTime>,
    },
    /// Find a machine in the identity database by number or title.
    Lookup { query: String },
    /// Print when each table database was last updated by its publisher.
    Versions,
}

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| e.to_string())
}

fn start_of_day(value: &str) -> Result<OffsetDateTime, String> {
    Ok(parse_date(value)?.midnight().assume_utc())
}

fn end_of_day(value: &str) -> Result<OffsetDateTime, String> {
    Ok(parse_date(value)?.with_time(time!(23:59:59.999_999_999)).assume_utc())
}
