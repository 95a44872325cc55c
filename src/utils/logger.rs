//! Logger utility for application-wide logging
//!
//! A custom logger that works with the standard log crate but also
//! mirrors every message into a log file, so long batch runs leave a
//! record next to their output.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Level, Metadata, LevelFilter};

/// Custom logger implementation
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    /// Most verbose level that is emitted
    level: Level,
}

impl Logger {
    /// Creates a new logger instance
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    /// * `level` - Most verbose level to emit
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new(log_file: &str, level: Level) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    /// Logs a message to the log file
    fn log_to_file(&self, message: &str) -> io::Result<()> {
        if let Some(file) = &mut *self.file.lock().unwrap() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Static method to initialize the global logger
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    /// * `verbose` - Emit debug messages as well
    pub fn init_global_logger(log_file: &str, verbose: bool) -> io::Result<()> {
        let level = if verbose { Level::Debug } else { Level::Info };
        let global_logger = Logger::new(log_file, level)?;

        // Ignore the SetLoggerError since this runs once at startup
        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
        Ok(())
    }
}

// Implement the Log trait to make our Logger work with the log crate
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.log_to_file(&message);

            // Also print to console
            println!("{}", message);
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}
