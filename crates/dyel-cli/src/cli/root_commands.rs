use clap::{Args, Subcommand};

use super::subcommands::ProgramCommands;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the database, apply pending migrations, and report the schema version.
    Migrate,
    /// Serve the HTTP API until interrupted.
    Serve(ServeArgs),
    /// Manage workout programs.
    Program {
        #[command(subcommand)]
        action: ProgramCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Override `server.host`.
    #[arg(long)]
    pub host: Option<String>,
    /// Override `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}
