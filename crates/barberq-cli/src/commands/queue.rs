use barberq_core::{Command, ValidationError};
use clap::Subcommand;

use crate::common::{open, print_events, print_json};

#[derive(Subcommand)]
pub enum QueueAction {
    /// List waiting clients with projected times
    List,
    /// Remove a waiting client by id
    Remove {
        id: String,
    },
    /// Re-run the duration rules for every waiting client
    Recompute,
}

pub fn run(action: QueueAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open()?;
    match action {
        QueueAction::List => {
            print_json(&app.snapshot().queue)?;
        }
        QueueAction::Remove { id } => {
            let events = app.dispatch(Command::RemoveQueued { id: id.clone() })?;
            if events.is_empty() {
                return Err(ValidationError::UnknownQueueItem(id).into());
            }
            print_events(&events)?;
        }
        QueueAction::Recompute => {
            let events = app.dispatch(Command::RecomputeQueue)?;
            print_events(&events)?;
        }
    }
    Ok(())
}
