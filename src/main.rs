//! `pindex` command-line front-end.

mod cli;

use crate::cli::{Cli, Command};
use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use pindex_config::Settings;
use pindex_index::{DatabaseManager, EntryQuery};
use pindex_models::{IdentityLookup, Level, Message};
use std::fmt::Debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "PINDEX_LOG";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).map_err(diagnostic)?;
    let mut manager = DatabaseManager::open(settings).map_err(diagnostic)?;

    match cli.command {
        Command::Refresh => {
            manager.on_progress(|percent| tracing::debug!(percent, "Refresh progress"));
            let report = manager.refresh();
            print_messages(&report.messages);
            if report.result {
                let count = manager.entries(false).map_err(diagnostic)?.len();
                println!("Indexed {count} entries");
            }
        },
        Command::Index { rebuild } => {
            let count = manager.entries(rebuild).map_err(diagnostic)?.len();
            println!("Indexed {count} entries");
        },
        Command::Tags => {
            manager.entries(false).map_err(diagnostic)?;
            for tag in manager.tags() {
                println!("{tag}");
            }
        },
        Command::Search { text, tags, since, until } => {
            manager.entries(false).map_err(diagnostic)?;
            let query = EntryQuery { text, updated_after: since, updated_before: until, tags };
            for entry in manager.search(&query) {
                println!("{}\t{}\t{}", entry.source_name, entry.title, entry.url);
            }
        },
        Command::Lookup { query } => {
            if manager.settings().identity_source().is_none() {
                return Err(miette!("No identity source is configured"));
            }
            manager.load_databases().map_err(diagnostic)?;
            let record = manager
                .identity()
                .and_then(|identity| identity.lookup(&query))
                .ok_or_else(|| miette!("No machine matches {query:?}"))?;
            println!("{}", serde_json::to_string_pretty(&record).into_diagnostic()?);
            println!("{}", record.ipdb_url());
        },
        Command::Versions => {
            manager.load_databases().map_err(diagnostic)?;
            print_messages(&manager.version_messages());
        },
    }
    Ok(())
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        match message.level {
            Level::Information => println!("{message}"),
            Level::Warning | Level::Error => eprintln!("{message}"),
        }
    }
}

/// Library errors carry an `exn` tree; its debug rendering keeps every frame.
fn diagnostic(error: impl Debug) -> miette::Report {
    miette!("{error:?}")
}
