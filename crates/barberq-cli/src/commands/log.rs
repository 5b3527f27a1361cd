use barberq_core::{Command, ValidationError};
use clap::Subcommand;
use serde::Serialize;

use crate::common::{open, print_events, print_json};

#[derive(Subcommand)]
pub enum LogAction {
    /// List finished services, oldest first, with the day summary
    List,
    /// Delete one entry by id
    Remove {
        id: String,
    },
    /// Delete every entry
    Clear,
    /// Print the log as plain text
    Export,
}

#[derive(Serialize)]
struct LogListing {
    summary: barberq_core::DaySummary,
    entries: Vec<barberq_core::LogEntry>,
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open()?;
    match action {
        LogAction::List => {
            let snapshot = app.snapshot();
            print_json(&LogListing {
                summary: snapshot.summary,
                entries: snapshot.log,
            })?;
        }
        LogAction::Remove { id } => {
            let events = app.dispatch(Command::RemoveLogEntry { id: id.clone() })?;
            if events.is_empty() {
                return Err(ValidationError::UnknownLogEntry(id).into());
            }
            print_events(&events)?;
        }
        LogAction::Clear => {
            let events = app.dispatch(Command::ClearLog)?;
            print_events(&events)?;
        }
        LogAction::Export => {
            print!("{}", app.export_log());
        }
    }
    Ok(())
}
