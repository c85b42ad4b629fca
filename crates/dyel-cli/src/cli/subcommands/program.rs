use clap::Subcommand;

/// Program aggregate commands.
///
/// `--file -` reads the JSON document from stdin.
#[derive(Clone, Debug, Subcommand)]
pub enum ProgramCommands {
    /// Create a program from a JSON document.
    Create {
        #[arg(long, default_value = "-")]
        file: String,
    },
    /// Get a program with all of its days and exercises.
    Get { id: String },
    /// List every program.
    List,
    /// Replace a program's fields and children from a JSON document.
    Update {
        id: String,
        #[arg(long, default_value = "-")]
        file: String,
    },
    /// Delete a program and everything under it.
    Delete { id: String },
}
