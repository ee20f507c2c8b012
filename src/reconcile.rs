//! Finding reconciliation: pair suppression, deduplication, final ordering.
//!
//! Violation/confirmation rule pairs share a `subject` in the catalogue
//! (e.g. the root-user and non-root-user rules are both about
//! `container-user`). They are mutually exclusive by construction, but a
//! badly authored pattern pair can double-fire on one instruction; when
//! that happens the violation wins and the confirmation is dropped.

use std::collections::HashSet;

use crate::catalogue::Catalogue;
use crate::finding::{Category, Finding, Polarity};

/// Reduce raw findings to the final, ordered list.
///
/// 1. A confirmation whose paired violation (same category and subject)
///    fired on the same line is dropped.
/// 2. Identical `(rule_id, line_number, suggestion)` triples collapse to
///    one finding. The rendered suggestion is part of the key so that
///    several distinct matches on one line (one finding per matched
///    package, say) all survive.
/// 3. Output is sorted most severe first, then by ascending line, so the
///    most actionable issues surface first. The sort is stable; ties keep
///    catalogue order from the evaluator.
pub fn reconcile(findings: Vec<Finding>, catalogue: &Catalogue) -> Vec<Finding> {
    let violated_subjects: HashSet<(Category, String, usize)> = findings
        .iter()
        .filter(|f| f.polarity == Polarity::Violation)
        .filter_map(|f| {
            let subject = catalogue.get(&f.rule_id)?.subject.clone()?;
            Some((f.category, subject, f.line_number))
        })
        .collect();

    let mut seen: HashSet<(String, usize, String)> = HashSet::new();
    let mut out: Vec<Finding> = Vec::new();

    for finding in findings {
        if finding.polarity == Polarity::Confirmation {
            let paired = catalogue
                .get(&finding.rule_id)
                .and_then(|r| r.subject.clone())
                .is_some_and(|subject| {
                    violated_subjects.contains(&(finding.category, subject, finding.line_number))
                });
            if paired {
                continue;
            }
        }

        let key = (
            finding.rule_id.clone(),
            finding.line_number,
            finding.suggestion.clone(),
        );
        if seen.insert(key) {
            out.push(finding);
        }
    }

    // Severity variants are declared most severe first, so the plain
    // ascending sort puts high above medium above low.
    out.sort_by_key(|f| (f.severity, f.line_number));
    out
}
