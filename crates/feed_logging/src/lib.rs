#![deny(missing_docs)]
//! Logging for the status feed crates.
//!
//! Library code logs through the `feed_*` macros. Binaries pick where the
//! output goes with [`initialize`]; tests call [`initialize_for_tests`].

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// `log::trace!` for feed crates.
#[macro_export]
macro_rules! feed_trace {
    ($($arg:tt)+) => { $crate::__log::log!($crate::__log::Level::Trace, $($arg)+) };
}

/// `log::debug!` for feed crates.
#[macro_export]
macro_rules! feed_debug {
    ($($arg:tt)+) => { $crate::__log::log!($crate::__log::Level::Debug, $($arg)+) };
}

/// `log::info!` for feed crates.
#[macro_export]
macro_rules! feed_info {
    ($($arg:tt)+) => { $crate::__log::log!($crate::__log::Level::Info, $($arg)+) };
}

/// `log::warn!` for feed crates.
#[macro_export]
macro_rules! feed_warn {
    ($($arg:tt)+) => { $crate::__log::log!($crate::__log::Level::Warn, $($arg)+) };
}

/// `log::error!` for feed crates.
#[macro_export]
macro_rules! feed_error {
    ($($arg:tt)+) => { $crate::__log::log!($crate::__log::Level::Error, $($arg)+) };
}

/// Where [`initialize`] sends log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// The log file only.
    File,
    /// stderr/stdout only.
    Terminal,
    /// Terminal and log file.
    Both,
}

impl LogDestination {
    fn writes_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn writes_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Installs the global logger at `level`.
///
/// The file at `log_path` is truncated. When it cannot be created the
/// remaining destinations still log. Only the first call has an effect.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = record_format();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);

    if destination.writes_terminal() {
        loggers.push(terminal_logger(level, config.clone()));
    }
    if destination.writes_file() {
        match File::create(log_path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("feed-tail: cannot open log file {}: {err}", log_path.display()),
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

/// Terminal logger for test binaries. Debug builds log at debug level.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let loggers: Vec<Box<dyn SharedLogger>> = vec![terminal_logger(level, Config::default())];
    // Another test may have installed it already.
    let _ = CombinedLogger::init(loggers);
}

fn record_format() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<TermLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}
