use crate::config::Overrides;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Export the re:Invent session catalog as a pipe-delimited report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML config file (defaults to ./reinvent.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Report destination, overriding `output_path`
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Event year used for start timestamps, overriding `event_year`
    #[arg(long)]
    pub year: Option<i32>,

    /// Only scrape these days (repeatable)
    #[arg(long = "day")]
    pub days: Vec<String>,

    /// Only scrape these venues (repeatable)
    #[arg(long = "venue")]
    pub venues: Vec<String>,

    /// Only write sessions of these types (repeatable)
    #[arg(long = "type")]
    pub types: Vec<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,
}

impl Args {
    /// Settings that take precedence over the config file and environment.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            event_year: self.year,
            output_path: self.output.clone(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output for terminals
    Pretty,
    /// One JSON object per event
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeatable_filters() {
        let args = Args::parse_from([
            "reinvent-sessions",
            "--day",
            "Monday",
            "--day",
            "Tuesday",
            "--venue",
            "Aria",
            "--year",
            "2018",
            "--tracing",
            "json",
        ]);
        assert_eq!(args.days, vec!["Monday", "Tuesday"]);
        assert_eq!(args.venues, vec!["Aria"]);
        assert!(args.types.is_empty());
        assert_eq!(args.year, Some(2018));
        assert_eq!(args.tracing, TracingFormat::Json);
    }

    #[test]
    fn test_overrides_carry_year_and_output() {
        let args = Args::parse_from(["reinvent-sessions", "--year", "2018", "-o", "out.txt"]);
        let overrides = args.overrides();
        assert_eq!(overrides.event_year, Some(2018));
        assert_eq!(overrides.output_path, Some(PathBuf::from("out.txt")));

        let none = Args::parse_from(["reinvent-sessions"]).overrides();
        assert!(none.event_year.is_none() && none.output_path.is_none());
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
