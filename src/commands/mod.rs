//! CLI command implementations
//!
//! Commands supported by the CLI application, wired together with the
//! Command pattern.

pub mod command_traits;
pub mod extract_command;
pub mod scan_command;

pub use command_traits::{Command, CommandFactory};
pub use extract_command::ExtractCommand;
pub use scan_command::ScanCommand;

use clap::ArgMatches;
use crate::errors::ZonalResult;

/// Factory for creating command instances based on CLI arguments
pub struct ZonalCommandFactory;

impl ZonalCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ZonalCommandFactory
    }
}

impl Default for ZonalCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for ZonalCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ZonalResult<Box<dyn Command>> {
        if args.get_flag("scan") {
            Ok(Box::new(ScanCommand::new(args)?))
        } else {
            // Default to the extraction command
            Ok(Box::new(ExtractCommand::new(args)?))
        }
    }
}
