//! CSV output formatter.
//!
//! One row per violation, in the report's severity order. Confirmations and
//! rule warnings carry no actionable work, so they are left out of the sheet.

use crate::finding::LintReport;

const HEADER: &str = "Severity,Line,Rule ID,Rule Title,Description,Suggestion,Line Content";

/// Formats a [`LintReport`] as CSV, one violation per row.
pub fn format(report: &LintReport) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for finding in report.findings.iter().filter(|f| f.is_issue()) {
        let row = [
            finding.severity.to_string(),
            finding.line_number.to_string(),
            finding.rule_id.clone(),
            finding.title.clone(),
            finding.description.clone(),
            finding.suggestion.clone(),
            finding.line_content.clone(),
        ];
        let encoded: Vec<String> = row.iter().map(|field| escape(field)).collect();
        out.push_str(&encoded.join(","));
        out.push('\n');
    }

    out
}

/// RFC 4180 quoting: a field containing a comma, quote, or line break is
/// wrapped in quotes, with embedded quotes doubled.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
