//! `slot` CLI — check and book calendar slots against a JSON event file.
//!
//! ## Usage
//!
//! ```sh
//! # Book a one-time event (times are local to --timezone unless they carry an offset)
//! slot add --name "Team Meeting" --start 2024-04-02T09:00 --end 2024-04-02T10:00 \
//!     --timezone Europe/Berlin
//!
//! # Book a weekly event on Mondays and Wednesdays
//! slot add --name Standup --start 2024-04-01T09:00 --end 2024-04-01T09:15 --days MON,WED
//!
//! # Ask whether a slot is free without booking it
//! slot check --start 2024-04-08T09:00:00Z --end 2024-04-08T09:30:00Z
//!
//! # List and fetch stored events
//! slot list --skip 0 --limit 20
//! slot get 6f1c2b8e-3a7d-4a0e-9d53-0c8f4f2b1a77
//!
//! # Use a different store file and config
//! slot --store team.json --config slot.toml list
//! ```

mod logging;
mod store_file;
mod time;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use slot_engine::scheduler::DEFAULT_PAGE_LIMIT;
use slot_engine::{Candidate, EventDraft, Scheduler, SchedulerConfig, SlotError};
use uuid::Uuid;

/// Exit status for a booking refused because the slot is taken.
const EXIT_SLOT_TAKEN: i32 = 2;

#[derive(Parser)]
#[command(
    name = "slot",
    version,
    about = "Check and book one-time and weekly calendar events"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file holding the stored events (created on first booking)
    #[arg(short, long, global = true, default_value = "events.json")]
    store: PathBuf,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a slot conflicts with a stored event
    Check(Window),
    /// Validate and book an event, refusing it if the slot is taken
    Add {
        /// Event name
        #[arg(short, long)]
        name: String,
        #[command(flatten)]
        window: Window,
    },
    /// List stored events in booking order
    List {
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
    },
    /// Show one stored event
    Get {
        /// Event id
        id: Uuid,
    },
}

#[derive(Args)]
struct Window {
    /// Start time: RFC 3339, or local YYYY-MM-DDTHH:MM[:SS] in --timezone
    #[arg(long)]
    start: String,
    /// End time, same formats as --start
    #[arg(long)]
    end: String,
    /// IANA timezone (defaults to validation.default_timezone)
    #[arg(short, long)]
    timezone: Option<String>,
    /// Comma-separated weekdays the event repeats on (e.g. MON,WED)
    #[arg(short, long)]
    days: Option<String>,
}

/// A parsed [`Window`].
struct ResolvedWindow {
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
    timezone: Tz,
    days: Option<Vec<slot_engine::Weekday>>,
}

impl Window {
    fn resolve(&self, config: &SchedulerConfig) -> Result<ResolvedWindow> {
        let timezone = match self.timezone.as_deref() {
            Some(name) => time::parse_timezone(name)?,
            None => config.validation.default_timezone,
        };
        Ok(ResolvedWindow {
            start: time::parse_instant(&self.start, timezone).context("Invalid --start")?,
            end: time::parse_instant(&self.end, timezone).context("Invalid --end")?,
            timezone,
            days: self
                .days
                .as_deref()
                .map(time::parse_days)
                .transpose()
                .context("Invalid --days")?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let store = store_file::load(&cli.store)?;
    let mut scheduler = Scheduler::new(store, config);

    match cli.command {
        Commands::Check(window) => {
            let window = window.resolve(scheduler.config())?;
            let candidate = Candidate {
                start: window.start,
                end: window.end,
                timezone: window.timezone,
                // An empty --days "" means one-time, as for `add`.
                weekdays: window.days.filter(|days| !days.is_empty()),
            };
            let result = scheduler
                .check(&candidate)
                .context("Failed to check for conflicts")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Add { name, window } => {
            let window = window.resolve(scheduler.config())?;
            let draft = EventDraft {
                name,
                start: window.start,
                end: window.end,
                timezone: window.timezone,
                days_of_week: window.days,
            };
            match scheduler.create_event(draft) {
                Ok(event) => {
                    store_file::save(&cli.store, scheduler.repository())?;
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                Err(e @ SlotError::SlotTaken { .. }) => {
                    eprintln!("{}", e);
                    process::exit(EXIT_SLOT_TAKEN);
                }
                Err(e) => return Err(e).context("Failed to create event"),
            }
        }
        Commands::List { skip, limit } => {
            let events = scheduler.list_events(skip, limit)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Commands::Get { id } => {
            let event = scheduler
                .get_event(id)?
                .with_context(|| format!("Event not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SchedulerConfig> {
    match path {
        Some(path) => SchedulerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(SchedulerConfig::default()),
    }
}
