use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "barberq-cli", version, about = "BarberQ CLI: one chair, a queue and a day log")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// The client in the chair and new requests
    Service {
        #[command(subcommand)]
        action: commands::service::ServiceAction,
    },
    /// Waiting clients
    Queue {
        #[command(subcommand)]
        action: commands::queue::QueueAction,
    },
    /// Finished services of the day
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print the current state as JSON
    Status,
    /// Follow the running service (Ctrl-C to stop)
    Watch {
        /// Seconds between re-evaluations
        #[arg(long, default_value = "1")]
        interval_secs: u64,
        /// Stop after this many re-evaluations
        #[arg(long)]
        max_ticks: Option<u64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BARBERQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Service { action } => commands::service::run(action),
        Commands::Queue { action } => commands::queue::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Status => commands::status::run_status(),
        Commands::Watch {
            interval_secs,
            max_ticks,
        } => commands::status::run_watch(interval_secs, max_ticks),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
