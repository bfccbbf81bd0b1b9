//! Logging to stderr and an optional log file, gated by SRI_LOG / SRI_QUIET.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;

pub const LOG_FILE_ENV: &str = "SRI_LOG_FILE";

fn log_level() -> String {
    env::var("SRI_LOG").map(|v| v.to_lowercase()).unwrap_or_default()
}

/// `SRI_QUIET=1|true` or `SRI_LOG=quiet|error` silence regular log lines.
pub fn is_quiet() -> bool {
    if env::var("SRI_QUIET").map(|v| v == "1" || v == "true").unwrap_or(false) {
        return true;
    }
    matches!(log_level().as_str(), "quiet" | "error")
}

/// `SRI_LOG=verbose|debug` enables verbose lines.
pub fn is_verbose() -> bool {
    matches!(log_level().as_str(), "verbose" | "debug")
}

fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}

fn append_to_log_file(line: &str) {
    let Ok(path) = env::var(LOG_FILE_ENV) else {
        return;
    };
    if path.is_empty() {
        return;
    }
    // Append-only; a log file we cannot write is not worth failing over.
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = writeln!(file, "{}", line);
    }
}

/// Log to stderr (stdout carries command output) and to `SRI_LOG_FILE` when set.
pub fn log(message: &str) {
    let line = format_line(message);
    if !is_quiet() {
        eprintln!("{}", line);
    }
    append_to_log_file(&line);
}

pub fn log_error(message: &str) {
    eprintln!("{}", message);
    append_to_log_file(&format_line(message));
}

pub fn log_verbose(message: &str) {
    if is_verbose() {
        log(message);
    }
}
