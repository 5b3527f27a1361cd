use barberq_core::{Command, Event, ServiceType, Speed};
use clap::Subcommand;

use crate::common::{open, print_events};

#[derive(Subcommand)]
pub enum ServiceAction {
    /// Accept a client: starts now if the chair is free, otherwise queues
    Request {
        /// cut, cut_seal, cut_beard, cut_beard_seal, color or perm
        service: String,
        /// fast, normal or slow
        #[arg(long, default_value = "normal")]
        speed: String,
        /// Accept even if it ends past the shift limit
        #[arg(long)]
        force: bool,
    },
    /// Show where a request would land without accepting it
    Preview {
        service: String,
        #[arg(long, default_value = "normal")]
        speed: String,
    },
    /// Put the next waiting client in the chair
    StartNext,
    /// Finish the running service and log it
    Finish,
    /// Drop the running service without logging it
    Cancel,
}

pub fn run(action: ServiceAction) -> Result<(), Box<dyn std::error::Error>> {
    let command = match action {
        ServiceAction::Request {
            service,
            speed,
            force,
        } => Command::Request {
            service: service.parse::<ServiceType>()?,
            speed: speed.parse::<Speed>()?,
            force,
        },
        ServiceAction::Preview { service, speed } => Command::Preview {
            service: service.parse::<ServiceType>()?,
            speed: speed.parse::<Speed>()?,
        },
        ServiceAction::StartNext => Command::StartNext,
        ServiceAction::Finish => Command::Finalize,
        ServiceAction::Cancel => Command::Cancel,
    };

    let mut app = open()?;
    let events = app.dispatch(command)?;
    if events.is_empty() {
        eprintln!("nothing to do");
    }
    print_events(&events)?;

    if let Some(Event::PlanRejected { plan, .. }) = events.first() {
        eprintln!(
            "request ends at {} past the shift limit; repeat with --force to accept",
            plan.end.with_timezone(&chrono::Local).format("%H:%M")
        );
        std::process::exit(2);
    }
    Ok(())
}
