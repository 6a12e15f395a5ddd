//! Fixture-driven host for the headless core.
//!
//! Boots an [`AppContext`] over in-memory sources loaded from JSON files,
//! syncs once and prints the ranked person list. Useful for checking
//! derivation and ranking against real exports without a device.
use anyhow::{Context, Result};
use clap::Parser;
use rapport_app::sources::{InMemoryCalendarSource, InMemoryContactSource, InMemoryLocationSource};
use rapport_app::workflows::sync_all;
use rapport_app::{init_logging, Action, AppContext, AuthorizationStatus, RapportConfig};
use rapport_core::{CalendarEvent, Contact};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "rapport-host", about = "Rank contacts from fixture files")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of contacts
    #[arg(long)]
    contacts: PathBuf,

    /// JSON array of calendar events
    #[arg(long)]
    events: Option<PathBuf>,

    /// Search query applied to the list
    #[arg(long, default_value = "")]
    query: String,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RapportConfig::load(path)?,
        None => RapportConfig::default(),
    };
    init_logging(&config.log_filter);

    let contacts: Vec<Contact> = read_json(&args.contacts)?;
    let events: Vec<CalendarEvent> = match &args.events {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let ctx = AppContext::builder(config)
        .contacts(Arc::new(InMemoryContactSource::authorized(contacts)))
        .calendar(Arc::new(InMemoryCalendarSource::authorized(events)))
        .location(Arc::new(InMemoryLocationSource::new(
            AuthorizationStatus::Denied,
        )))
        .build();

    sync_all(&ctx).await?;
    ctx.dispatch(Action::ListSearchQueryChanged(args.query.clone()));

    let persons = ctx.core().read(|s| s.filtered_persons());
    for person in &persons {
        let last_seen = person
            .days_since_contact
            .map(|d| format!("{d}d ago"))
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{} {:<32} {:<8} last seen {:<10}{}",
            person.affinity.symbol(),
            person.display_name(),
            person.affinity.label(),
            last_seen,
            if person.overdue { " overdue" } else { "" },
        );
    }
    println!("{} of {} persons", persons.len(), ctx.core().read(|s| s.persons.len()));
    Ok(())
}
