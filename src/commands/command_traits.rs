//! Command pattern interfaces
//!
//! Core Command pattern interfaces for the CLI application, enabling a
//! clean separation between argument parsing and execution.

use crate::errors::ZonalResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> ZonalResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches) -> ZonalResult<Box<dyn Command>>;
}
