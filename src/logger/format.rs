/// Console formatting and output
///
/// Format: `[HH:MM:SS.mmm] [LEVEL] [TAG] message` with level-dependent
/// colors, written to stdout (stderr for errors).
use colored::Colorize;

use super::levels::LogLevel;
use super::tags::LogTag;

/// Format a log line and write it to the console
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");

    let level_str = match level {
        LogLevel::Error => level.as_str().red().bold(),
        LogLevel::Warning => level.as_str().yellow().bold(),
        LogLevel::Info => level.as_str().green(),
        LogLevel::Debug => level.as_str().cyan(),
        LogLevel::Verbose => level.as_str().dimmed(),
    };

    let line = format!(
        "[{}] [{}] [{}] {}",
        timestamp.to_string().dimmed(),
        level_str,
        tag.label().blue(),
        message
    );

    if level == LogLevel::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
