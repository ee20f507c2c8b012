//! Human-readable colored text formatter.
//!
//! Produces a terminal-friendly report with ANSI color codes, showing
//! violations with source locations, confirmed good practices, rule
//! warnings, and a one-line summary.

use crate::finding::{LintReport, LintStatus, Severity};
use colored::Colorize;

/// Formats a [`LintReport`] as human-readable, ANSI-colored text.
///
/// Sections rendered (in order):
/// 1. **Header** — file name, timestamp, instruction and stage counts.
/// 2. **Violations** — issues with severity, rule, location, and suggestion.
/// 3. **Good practices** — confirmed positives.
/// 4. **Rule warnings** — catalogue entries that were skipped.
/// 5. **Summary** — overall status and severity counts.
pub fn format(report: &LintReport) -> String {
    let mut out = String::new();

    // Header
    out.push_str(&format!(
        "\n{}\n",
        format!("  Dockerfile Lint: {}  ", report.file)
            .bold()
            .on_blue()
            .white()
    ));
    out.push_str(&format!("  Timestamp: {}\n", report.analysis_timestamp));
    out.push_str(&format!(
        "  Scanned: {} instructions across {} stage(s)\n\n",
        report.instructions_scanned, report.stages
    ));

    // Violations — reconciliation already ordered findings most severe
    // first, so the flat list reads as severity groups. A peekable iterator
    // avoids allocating an intermediate Vec just to check emptiness.
    let mut issues = report.findings.iter().filter(|f| f.is_issue()).peekable();
    if issues.peek().is_some() {
        out.push_str(&format!("{}\n", "Violations".bold().underline()));
        for finding in issues {
            let severity_str = match finding.severity {
                Severity::High => "HIGH".red().bold().to_string(),
                Severity::Medium => " MED".yellow().bold().to_string(),
                Severity::Low => " LOW".blue().to_string(),
            };

            out.push_str(&format!(
                "  [{severity_str}] {rule_id:<28} {title}\n",
                rule_id = finding.rule_id.dimmed(),
                title = finding.title,
            ));
            out.push_str(&format!(
                "         {}\n",
                format!("line {}: {}", finding.line_number, finding.line_content).dimmed()
            ));
            out.push_str(&format!("         > {}\n", finding.suggestion.dimmed()));
        }
        out.push('\n');
    }

    // Confirmed good practices
    let mut confirmed = report.findings.iter().filter(|f| !f.is_issue()).peekable();
    if confirmed.peek().is_some() {
        out.push_str(&format!("{}\n", "Good practices".bold().underline()));
        for finding in confirmed {
            out.push_str(&format!(
                "  [{ok}] {rule_id:<28} {title} (line {line})\n",
                ok = "  OK".green().bold(),
                rule_id = finding.rule_id.dimmed(),
                title = finding.title,
                line = finding.line_number,
            ));
        }
        out.push('\n');
    }

    // Rule warnings
    if !report.warnings.is_empty() {
        out.push_str(&format!("{}\n", "Rule warnings".bold().underline()));
        for warning in &report.warnings {
            out.push_str(&format!(
                "  [{tag}] {rule_id:<28} {message}\n",
                tag = "WARN".yellow().bold(),
                rule_id = warning.rule_id.dimmed(),
                message = warning.message,
            ));
        }
        out.push('\n');
    }

    // Summary
    let status_str = match report.status {
        LintStatus::Passed => "PASSED".green().bold().to_string(),
        LintStatus::Warning => "WARNING".yellow().bold().to_string(),
        LintStatus::Failed => "FAILED".red().bold().to_string(),
    };

    // Single pass for all three severity counts.
    let (high, medium, low) = report.count_by_severity();
    out.push_str(&format!(
        "Result: {status_str}  |  {} high, {} medium, {} low, {} confirmed\n",
        high,
        medium,
        low,
        report.confirmation_count(),
    ));

    out
}
