mod cli;
mod json;

pub use cli::{print_cli_table, print_platforms, render_platforms, render_table};
pub use json::print_json;

use crate::aggregate::{DownloadsReport, LatestVersionReport, PriceReport, RatingReport, Summary};
use crate::model::QueryResult;
use anyhow::Result;
use serde::Serialize;

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// Result of one CLI command.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Summary(Summary),
    Downloads(DownloadsReport),
    Rating(RatingReport),
    Price(PriceReport),
    LatestVersion(LatestVersionReport),
    Name(QueryResult),
}

impl Report {
    /// The underlying query result, absent for a combined summary.
    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            Report::Summary(_) => None,
            Report::Downloads(report) => Some(&report.result),
            Report::Rating(report) => Some(&report.result),
            Report::Price(report) => Some(&report.result),
            Report::LatestVersion(report) => Some(&report.result),
            Report::Name(result) => Some(result),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result().map_or(true, QueryResult::is_success)
    }
}

pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => print_json(report),
    }
}
