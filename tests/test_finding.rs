use dockfix::finding::{Category, Finding, LintReport, LintStatus, Polarity, Severity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_finding(severity: Severity, polarity: Polarity, line: usize) -> Finding {
    Finding {
        rule_id: "test/rule".to_string(),
        title: "t".to_string(),
        category: match severity {
            Severity::High => Category::Security,
            Severity::Medium => Category::DependencyManagement,
            Severity::Low => Category::CiCd,
        },
        description: "d".to_string(),
        suggestion: "s".to_string(),
        severity,
        line_number: line,
        line_content: "c".to_string(),
        polarity,
    }
}

fn build_report(findings: Vec<Finding>, strict: bool) -> LintReport {
    LintReport::from_findings("Dockerfile", 5, 1, findings, vec![], strict)
}

// ---------------------------------------------------------------------------
// Status computation
// ---------------------------------------------------------------------------

#[test]
fn a_high_issue_fails_the_report() {
    let report = build_report(vec![make_finding(Severity::High, Polarity::Violation, 1)], false);
    assert_eq!(report.status, LintStatus::Failed);
    assert!(!report.passed);
}

#[test]
fn medium_issues_warn_but_do_not_fail() {
    let report = build_report(vec![make_finding(Severity::Medium, Polarity::Violation, 1)], false);
    assert_eq!(report.status, LintStatus::Warning);
    assert!(!report.passed);
}

#[test]
fn strict_mode_promotes_medium_to_failed() {
    let report = build_report(vec![make_finding(Severity::Medium, Polarity::Violation, 1)], true);
    assert_eq!(report.status, LintStatus::Failed);
}

#[test]
fn low_only_findings_still_pass() {
    let report = build_report(
        vec![
            make_finding(Severity::Low, Polarity::Violation, 1),
            make_finding(Severity::Low, Polarity::Violation, 2),
        ],
        false,
    );
    assert_eq!(report.status, LintStatus::Passed);
    assert!(report.passed);
}

#[test]
fn strict_mode_does_not_touch_low_findings() {
    let report = build_report(vec![make_finding(Severity::Low, Polarity::Violation, 1)], true);
    assert_eq!(report.status, LintStatus::Passed);
}

#[test]
fn confirmations_never_affect_status() {
    let report = build_report(
        vec![
            make_finding(Severity::High, Polarity::Confirmation, 1),
            make_finding(Severity::High, Polarity::Confirmation, 2),
        ],
        false,
    );
    assert_eq!(report.status, LintStatus::Passed);
    assert!(report.passed);
}

#[test]
fn an_absence_counts_as_an_issue() {
    let report = build_report(vec![make_finding(Severity::High, Polarity::Absence, 1)], false);
    assert_eq!(report.status, LintStatus::Failed);
}

#[test]
fn an_empty_report_passes() {
    let report = build_report(vec![], false);
    assert_eq!(report.status, LintStatus::Passed);
    assert!(report.passed);
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[test]
fn severity_counters_exclude_confirmations() {
    let report = build_report(
        vec![
            make_finding(Severity::High, Polarity::Violation, 1),
            make_finding(Severity::High, Polarity::Confirmation, 2),
            make_finding(Severity::Medium, Polarity::Violation, 3),
            make_finding(Severity::Low, Polarity::Violation, 4),
            make_finding(Severity::Low, Polarity::Violation, 5),
        ],
        false,
    );
    assert_eq!(report.high_count(), 1);
    assert_eq!(report.medium_count(), 1);
    assert_eq!(report.low_count(), 2);
    assert_eq!(report.confirmation_count(), 1);
    assert_eq!(report.count_by_severity(), (1, 1, 2));
}

#[test]
fn is_issue_is_false_only_for_confirmations() {
    assert!(make_finding(Severity::High, Polarity::Violation, 1).is_issue());
    assert!(make_finding(Severity::High, Polarity::Absence, 1).is_issue());
    assert!(!make_finding(Severity::High, Polarity::Confirmation, 1).is_issue());
}

#[test]
fn severity_orders_most_severe_first() {
    assert!(Severity::High < Severity::Medium);
    assert!(Severity::Medium < Severity::Low);
}

#[test]
fn report_carries_scan_metadata() {
    let report = build_report(vec![], false);
    assert_eq!(report.file, "Dockerfile");
    assert_eq!(report.instructions_scanned, 5);
    assert_eq!(report.stages, 1);
    assert!(report.warnings.is_empty());
}
