use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gcal_events::calendar::{datetime, CalendarEvent, DraftBuilder, EventStatus, EventTime, When};
use gcal_events::storage::config::Config;
use gcal_events::sync::manager::{cancelled_only, select};
use gcal_events::sync::{EventManager, GoogleCalendarClient};

use crate::prompt;

const RULE: &str = "-------------------------------------------------------------------------";
const NO_EVENTS: &str = "No events found.";

#[derive(Parser)]
#[command(name = "gcal-events")]
#[command(about = "Create, browse and maintain events on a Google calendar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the next events from now
    Upcoming {
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Show every event in a year
    Year { year: i32 },
    /// Find past and future events whose name contains a keyword
    Search { keyword: String },
    /// Create an event, asking for each field in turn
    Create,
    /// Cancel a past event (lists candidates when no position is given)
    Cancel { position: Option<usize> },
    /// Restore a cancelled past event
    Restore { position: Option<usize> },
    /// Delete a past event
    Delete { position: Option<usize> },
    /// Hand a future event over to a new organizer
    Reassign {
        position: Option<usize>,
        email: Option<String>,
    },
    /// Import an event from a JSON file
    Import { file: PathBuf },
    /// Export a past event to a JSON file
    Export {
        position: Option<usize>,
        file: Option<PathBuf>,
    },
}

fn connect(config: &Config) -> Result<EventManager<GoogleCalendarClient>> {
    let token_var = &config.google.access_token_env;
    let token = std::env::var(token_var)
        .with_context(|| format!("Set {} to a Google Calendar access token", token_var))?;

    let client = GoogleCalendarClient::new(token)
        .with_base_url(config.google.base_url.clone())
        .with_calendar_id(config.google.calendar_id.clone());

    Ok(EventManager::new(client).with_query_config(&config.query))
}

pub async fn run(command: Commands, config: &Config) -> Result<()> {
    let manager = connect(config)?;

    match command {
        Commands::Upcoming { count } => {
            let count = count.unwrap_or(config.query.upcoming_count);
            let events = manager.upcoming_events(datetime::now(), count).await?;
            print_events(&events);
        }
        Commands::Year { year } => {
            let events = manager.events_in_year(year).await?;
            print_events(&events);
        }
        Commands::Search { keyword } => {
            let events = manager.search(&keyword).await?;
            if events.is_empty() {
                println!("{}", NO_EVENTS);
            }
            for event in &events {
                println!("{}", short_line(event));
            }
        }
        Commands::Create => {
            let builder = DraftBuilder::new(
                config.attendee_validator(),
                datetime::today(),
                config.rules.max_year,
            );
            let stdin = io::stdin();
            let draft = prompt::collect_draft(builder, &mut stdin.lock(), &mut io::stdout())?;
            let created = manager.create_event(&draft).await?;
            println!("Event created: {}", created.summary);
        }
        Commands::Cancel { position } => {
            let events = manager.past_events().await?;
            let Some(event) = pick(&events, position)? else {
                return Ok(());
            };
            let cancelled = manager.cancel_event(event).await?;
            println!("Successfully cancelled event `{}`", cancelled.summary);
        }
        Commands::Restore { position } => {
            let events = cancelled_only(manager.cancelled_past_events().await?);
            let Some(event) = pick(&events, position)? else {
                return Ok(());
            };
            let restored = manager.restore_event(event).await?;
            println!("Successfully restored event `{}`", restored.summary);
        }
        Commands::Delete { position } => {
            let events = manager.past_events().await?;
            let chosen = match position {
                Some(p) => Some(select(&events, p).with_context(|| format!("No event at position {}", p))?),
                None if events.is_empty() => None,
                None => {
                    print_events(&events);
                    return Ok(());
                }
            };
            let outcome = manager.delete_event(chosen).await?;
            println!("{}", outcome);
        }
        Commands::Reassign { position, email } => {
            let events = manager.future_events().await?;
            let Some(event) = pick(&events, position)? else {
                return Ok(());
            };
            let Some(email) = email else {
                bail!("Please enter the email address of the new organizer");
            };
            let moved = manager.reassign_organizer(&event, &email).await?;
            println!("New Organizer: {}", moved.organizer_email().unwrap_or("unknown"));
        }
        Commands::Import { file } => {
            let imported = manager.import_event(&file).await?;
            println!("Successfully imported event `{}`", imported.summary);
        }
        Commands::Export { position, file } => {
            let events = manager.past_events().await?;
            let Some(event) = pick(&events, position)? else {
                return Ok(());
            };
            let Some(file) = file else {
                bail!("Please give the name of the .json file to store the event in");
            };
            manager.export_event(&event, &file)?;
            println!("Successfully export event `{}`", event.summary);
        }
    }

    Ok(())
}

/// Without a position the candidates are listed and nothing is chosen.
fn pick(events: &[CalendarEvent], position: Option<usize>) -> Result<Option<CalendarEvent>> {
    if events.is_empty() {
        println!("{}", NO_EVENTS);
        return Ok(None);
    }

    match position {
        Some(p) => select(events, p)
            .cloned()
            .map(Some)
            .with_context(|| format!("No event at position {}", p)),
        None => {
            print_events(events);
            Ok(None)
        }
    }
}

fn print_events(events: &[CalendarEvent]) {
    println!("{}", RULE);
    if events.is_empty() {
        println!("{}", NO_EVENTS);
    }
    for (i, event) in events.iter().enumerate() {
        let marker = if event.status == EventStatus::Cancelled { " (cancelled)" } else { "" };
        let when = match event.start.when {
            When::At(at) => format!("{} GMT{}", at.format("%Y-%m-%d %H:%M"), at.format("%:z")),
            When::AllDay(day) => day.format("%Y-%m-%d").to_string(),
        };
        println!("{}. {} {}{}", i + 1, when, event.summary, marker);
    }
    println!("{}", RULE);
}

fn short_line(event: &CalendarEvent) -> String {
    format!("{} {}", start_label(&event.start), event.summary)
}

fn start_label(start: &EventTime) -> String {
    match start.when {
        When::At(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        When::AllDay(day) => day.format("%Y-%m-%d").to_string(),
    }
}
