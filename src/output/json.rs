//! JSON output formatter.
//!
//! Produces a pretty-printed JSON document containing file metadata, a
//! severity summary, the findings, and any rule warnings.

use crate::finding::LintReport;

#[derive(serde::Serialize)]
struct JsonOutput<'a> {
    file: &'a str,
    analysis_timestamp: &'a str,
    status: &'a crate::finding::LintStatus,
    passed: bool,
    instructions_scanned: usize,
    stages: usize,
    summary: Summary,
    findings: &'a [crate::finding::Finding],
    warnings: &'a [crate::finding::RuleWarning],
}

#[derive(serde::Serialize)]
struct Summary {
    high: usize,
    medium: usize,
    low: usize,
    confirmations: usize,
}

/// Formats a [`LintReport`] as pretty-printed JSON.
///
/// The output includes file metadata, a severity summary object, and the
/// full list of findings (violations and confirmations alike, already in
/// severity order).
///
/// # Panics
///
/// Panics if the report cannot be serialized (should not happen with valid data).
pub fn format(report: &LintReport) -> String {
    let output = JsonOutput {
        file: &report.file,
        analysis_timestamp: &report.analysis_timestamp,
        status: &report.status,
        passed: report.passed,
        instructions_scanned: report.instructions_scanned,
        stages: report.stages,
        summary: {
            // Single pass over findings instead of three separate iterations.
            let (high, medium, low) = report.count_by_severity();
            Summary {
                high,
                medium,
                low,
                confirmations: report.confirmation_count(),
            }
        },
        findings: &report.findings,
        warnings: &report.warnings,
    };

    serde_json::to_string_pretty(&output).expect("JSON serialization failed")
}
