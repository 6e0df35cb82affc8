use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "coinpulse")]
#[command(about = "Bithumb sector dashboard service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server and the 1-second ticker poll worker
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Fetch one ticker snapshot and print a sector summary
    Snapshot,
    /// Show the state of the local persisted stores
    Status,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Snapshot => {
            commands::snapshot::run().await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
    }
}
