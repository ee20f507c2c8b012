//! Rule evaluation over the parsed instruction sequence.
//!
//! Each rule is applied according to its [`MatchScope`]:
//!
//! - single-line rules run against every directive's logical text, one
//!   finding per non-overlapping pattern match;
//! - adjacent-pair rules run against every pair of neighbouring directives
//!   joined with a newline, so comments and blank lines between them cannot
//!   mask a match;
//! - whole-file rules fire once, anchored at line 1, when no directive
//!   matches their presence pattern.
//!
//! Rules evaluate independently and in parallel via [rayon]; the collected
//! findings are explicitly re-sorted by (catalogue order, line number)
//! afterwards, so the output is deterministic regardless of scheduling.
//! A degenerate rule never aborts the run: it is skipped and reported as a
//! [`RuleWarning`].

use rayon::prelude::*;

use crate::catalogue::{Catalogue, MatchScope, Rule};
use crate::finding::{Finding, Polarity, RuleWarning};
use crate::parser::Instruction;

/// Raw evaluation output: findings in (catalogue order, line) order plus
/// per-rule warnings, both ready for the reconciler.
#[derive(Debug)]
pub struct Evaluation {
    pub findings: Vec<Finding>,
    pub warnings: Vec<RuleWarning>,
}

/// Evaluate every catalogue rule against the instruction sequence.
pub fn evaluate(instructions: &[Instruction], catalogue: &Catalogue) -> Evaluation {
    let directives: Vec<&Instruction> = instructions.iter().filter(|i| i.is_directive()).collect();

    let per_rule: Vec<(Vec<Finding>, Option<RuleWarning>)> = catalogue
        .rules()
        .par_iter()
        .map(|rule| evaluate_rule(rule, &directives))
        .collect();

    // Parallel collection preserves rule order, but ordering is a contract,
    // not a scheduling accident: sort by (catalogue index, line) explicitly.
    let mut indexed: Vec<(usize, Finding)> = Vec::new();
    let mut warnings = Vec::new();
    for (index, (findings, warning)) in per_rule.into_iter().enumerate() {
        indexed.extend(findings.into_iter().map(|f| (index, f)));
        warnings.extend(warning);
    }
    indexed.sort_by_key(|(index, f)| (*index, f.line_number));

    Evaluation {
        findings: indexed.into_iter().map(|(_, f)| f).collect(),
        warnings,
    }
}

fn evaluate_rule(rule: &Rule, directives: &[&Instruction]) -> (Vec<Finding>, Option<RuleWarning>) {
    // The regex engine is linear-time and cannot fail mid-match, so the
    // recoverable per-rule failure mode is a degenerate pattern: one that
    // matches the empty string would flood every window (or, for `unless`,
    // silence the rule everywhere). Skip the rule and warn.
    if rule.pattern.is_match("") {
        return (vec![], Some(degenerate(rule, "regex_pattern")));
    }
    if let Some(unless) = &rule.unless {
        if unless.is_match("") {
            return (vec![], Some(degenerate(rule, "unless")));
        }
    }

    let mut findings = Vec::new();
    match rule.scope {
        MatchScope::SingleLine => {
            for instruction in directives {
                match_window(rule, &instruction.text, instruction.line(), &mut findings);
            }
        }
        MatchScope::AdjacentPair => {
            for pair in directives.windows(2) {
                let window = format!("{}\n{}", pair[0].text, pair[1].text);
                match_window(rule, &window, pair[0].line(), &mut findings);
            }
        }
        MatchScope::WholeFile => {
            let present = directives.iter().any(|i| rule.pattern.is_match(&i.text));
            if !present {
                findings.push(absence_finding(rule));
            }
        }
    }
    (findings, None)
}

/// Apply a single-line or pair rule to one window of text, honouring the
/// `when` gate and `unless` exception, and append one finding per match.
/// `when` anchors as well as gates: the pattern scans only the text after
/// the first gate match, so an install-gated package rule sees the install
/// list, not the commands before it. `unless` is checked against the whole
/// window. `{match}` in the suggestion is replaced by capture group 1 when
/// the pattern has one, otherwise by the whole match.
fn match_window(rule: &Rule, window: &str, line: usize, findings: &mut Vec<Finding>) {
    let scan = match &rule.when {
        Some(when) => match when.find(window) {
            Some(gate) => &window[gate.end()..],
            None => return,
        },
        None => window,
    };
    if let Some(unless) = &rule.unless {
        if unless.is_match(window) {
            return;
        }
    }

    let line_content = window.lines().next().unwrap_or_default().to_string();
    for caps in rule.pattern.captures_iter(scan) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let matched = caps.get(1).map_or(whole, |m| m.as_str());
        findings.push(Finding {
            rule_id: rule.id.clone(),
            title: rule.title.clone(),
            category: rule.category,
            description: rule.description.clone(),
            suggestion: rule.suggestion.replace("{match}", matched),
            severity: rule.category.severity(),
            line_number: line,
            line_content: line_content.clone(),
            polarity: rule.polarity,
        });
    }
}

fn absence_finding(rule: &Rule) -> Finding {
    Finding {
        rule_id: rule.id.clone(),
        title: rule.title.clone(),
        category: rule.category,
        description: rule.description.clone(),
        suggestion: rule.suggestion.clone(),
        severity: rule.category.severity(),
        line_number: 1,
        // There is no source line to cite for an absence.
        line_content: format!("{} (whole file)", rule.title),
        polarity: Polarity::Absence,
    }
}

fn degenerate(rule: &Rule, field: &str) -> RuleWarning {
    RuleWarning {
        rule_id: rule.id.clone(),
        message: format!("`{field}` matches the empty string; rule skipped"),
    }
}
