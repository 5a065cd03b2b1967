//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::schedule::normalize::parse_date;

/// Command-line arguments for `gantt-sched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gantt-sched",
    version,
    about = "Resolve dates for a portfolio of dependent tasks and lay them out for a Gantt chart.",
    long_about = None
)]
pub struct CliArgs {
    /// Task table to schedule (`.csv` or `.json`).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Date treated as "today" (default: the local date).
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub today: Option<NaiveDate>,

    /// Settings file (JSON).
    ///
    /// Default: `settings.json` in the user config directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the resolved schedule as CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Also write the scheduled task table as JSON.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Include portfolio statistics in the output.
    #[arg(long)]
    pub stats: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GANTT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command_line() {
        let args = CliArgs::try_parse_from([
            "gantt-sched",
            "tasks.csv",
            "--today",
            "2026-02-23",
            "--format",
            "json",
            "--stats",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("tasks.csv"));
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2026, 2, 23));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.stats);
        assert!(args.export_csv.is_none());
    }

    #[test]
    fn rejects_bad_today() {
        assert!(CliArgs::try_parse_from(["gantt-sched", "t.csv", "--today", "soon"]).is_err());
    }
}
