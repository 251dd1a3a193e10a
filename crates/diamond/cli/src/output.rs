//! Output formatting utilities
//!
//! Structured formats go to stdout; logs go to stderr.

use colored::*;
use diamond_types::CheckStatus;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and coloured status lines
    #[default]
    Human,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputFormat::Human)
    }
}

/// Print rows as a table, or as a structured list.
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Human => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => print_single(&data, format),
    }
}

/// Print a single item; human output falls back to pretty JSON.
pub fn print_single<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Human | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print an aligned `key: value` line.
pub fn print_field(key: &str, value: impl std::fmt::Display) {
    println!("{:<22} {}", format!("{key}:").bold(), value);
}

pub fn colorize_status(status: CheckStatus) -> ColoredString {
    match status {
        CheckStatus::Pass => "pass".green(),
        CheckStatus::Warn => "warn".yellow(),
        CheckStatus::Fail => "fail".red(),
        CheckStatus::Unknown => "unknown".magenta(),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
