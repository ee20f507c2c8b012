//! Output formatting for lint reports.
//!
//! Four formats are supported:
//!
//! | Format | Module | Use case |
//! |--------|--------|----------|
//! | [`Pretty`](OutputFormat::Pretty) | [`pretty`] | Terminal / human review |
//! | [`Json`](OutputFormat::Json)     | [`json`]   | Automation / scripting  |
//! | [`Csv`](OutputFormat::Csv)       | [`csv`]    | Spreadsheets / triage   |
//! | [`Sarif`](OutputFormat::Sarif)   | [`sarif`]  | CI/CD integration       |
//!
//! Use [`format_report`] to render a [`LintReport`] in any of the above
//! formats.

pub mod csv;
pub mod json;
pub mod pretty;
pub mod sarif;

use crate::finding::LintReport;

/// Supported output formats for lint reports.
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text with severity-ordered findings.
    Pretty,
    /// Machine-readable JSON.
    Json,
    /// One violation per row, for spreadsheet triage.
    Csv,
    /// [SARIF 2.1.0](https://sarifweb.azurewebsites.net/) for CI/CD tool integration.
    Sarif,
}

/// Formats a [`LintReport`] in the requested [`OutputFormat`].
///
/// # Examples
///
/// ```rust,no_run
/// use dockfix::output::{format_report, OutputFormat};
/// # use dockfix::finding::LintReport;
/// # fn example(report: &LintReport) {
/// let json = format_report(report, &OutputFormat::Json);
/// println!("{json}");
/// # }
/// ```
pub fn format_report(report: &LintReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::format(report),
        OutputFormat::Json => json::format(report),
        OutputFormat::Csv => csv::format(report),
        OutputFormat::Sarif => sarif::format(report),
    }
}
