use barberq_core::{Command, Event};
use clap::Subcommand;

use crate::common::{open, print_events};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "serviceBaseMin.color", "limits.1.hour")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open()?;
    match action {
        ConfigAction::Get { key } => match app.config().get(&key) {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        ConfigAction::Set { key, value } => {
            let events = app.dispatch(Command::SetConfig { key, value })?;
            match events.first() {
                Some(Event::ConfigUpdated { applied: false, key, .. }) => {
                    println!("kept previous value for {key}");
                }
                _ => println!("ok"),
            }
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(app.config())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let events = app.dispatch(Command::ResetConfig)?;
            print_events(&events)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
