use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Log verbosity, from silent to everything
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Parse a level name ("warning", "debug", ...) or its number
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(n) = s.parse::<i32>() {
            return Ok(Self::from_i32(n));
        }
        match s.to_lowercase().as_str() {
            "nothing" | "off" => Ok(LogLevel::Nothing),
            "user" => Ok(LogLevel::User),
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "all" | "trace" => Ok(LogLevel::All),
            _ => anyhow::bail!(
                "Invalid log level: {}. Valid options: nothing, user, error, warning, info, debug, all",
                s
            ),
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::User | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

/// One output line
pub fn format_line(level: log::Level, target: &str, args: &fmt::Arguments) -> String {
    format!("[{}] {}: {}", level, target, args)
}

struct Logger {
    filter: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), record.args());
        let _ = writeln!(self.sink.lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

/// Install the process logger, writing to `log_file` or stderr
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let sink: Box<dyn Write + Send> = match log_file {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?,
        ),
        None => Box::new(io::stderr()),
    };

    let filter = level.to_filter();
    log::set_boxed_logger(Box::new(Logger {
        filter,
        sink: Mutex::new(sink),
    }))
    .map_err(|e| anyhow::anyhow!("Logger already installed: {}", e))?;
    log::set_max_level(filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_i32() {
        assert_eq!(LogLevel::from_i32(0), LogLevel::Nothing);
        assert_eq!(LogLevel::from_i32(1), LogLevel::User);
        assert_eq!(LogLevel::from_i32(2), LogLevel::Error);
        assert_eq!(LogLevel::from_i32(3), LogLevel::Warning);
        assert_eq!(LogLevel::from_i32(4), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(5), LogLevel::Debug);
        assert_eq!(LogLevel::from_i32(6), LogLevel::All);
    }

    #[test]
    fn test_log_level_as_i32() {
        assert_eq!(LogLevel::Nothing.as_i32(), 0);
        assert_eq!(LogLevel::Info.as_i32(), 4);
        assert_eq!(LogLevel::All.as_i32(), 6);
    }

    #[test]
    fn test_log_level_invalid() {
        // Invalid values should default to Info
        assert_eq!(LogLevel::from_i32(100), LogLevel::Info);
        assert_eq!(LogLevel::from_i32(-1), LogLevel::Info);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::parse("warn").unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::parse("2").unwrap(), LogLevel::Error);
        assert!(LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Nothing.to_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::User.to_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::All.to_filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(
            log::Level::Warn,
            "signhands::catalog",
            &format_args!("entry {}", 3),
        );
        assert_eq!(line, "[WARN] signhands::catalog: entry 3");
    }
}
