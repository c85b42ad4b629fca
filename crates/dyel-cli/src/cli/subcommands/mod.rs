mod program;

pub use program::ProgramCommands;
