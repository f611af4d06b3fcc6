//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;

pub use args::{Cli, Commands, ConfigCommands, OutputFormat};
pub use commands::{execute_command, Selection};
pub use error::{CliError, CliResult};
