//! Analysis orchestration.
//!
//! [`run_analysis`] is the main entry-point for analyzing one Dockerfile:
//! parse, evaluate the active rule catalogue, reconcile the findings, and
//! rewrite. The pipeline is a straight data flow; every stage consumes an
//! immutable snapshot from the previous one, and no stage performs I/O —
//! callers read the file and hand in its text.

use crate::catalogue::Catalogue;
use crate::config::Config;
use crate::error::ParseError;
use crate::evaluator::{self, Evaluation};
use crate::finding::LintReport;
use crate::parser;
use crate::reconcile;
use crate::rewriter::{self, OptimizedDockerfile};

/// Everything one pipeline run produces: the diagnostic report and the
/// rewritten Dockerfile.
#[derive(Debug)]
pub struct Analysis {
    pub report: LintReport,
    pub optimized: OptimizedDockerfile,
}

/// Runs the full pipeline over one Dockerfile's text.
///
/// # Pipeline
///
/// 1. Parse the text into logical instructions.
/// 2. Drop rules whose category is disabled in [`Config::categories`].
/// 3. Evaluate the remaining rules (in parallel, deterministically ordered).
/// 4. Reconcile: pair suppression, dedup, severity ordering.
/// 5. Rewrite mechanically and assemble the [`LintReport`].
///
/// # Errors
///
/// Fails only on a malformed line continuation; one bad rule never aborts
/// the run (it surfaces in [`LintReport::warnings`]).
///
/// # Examples
///
/// ```
/// use dockfix::{analysis, catalogue::Catalogue, config::Config};
///
/// let text = "FROM ubuntu:24.04\nUSER 10001\nCMD [\"./app\"]\n";
/// let analysis =
///     analysis::run_analysis("Dockerfile", text, Catalogue::builtin(), &Config::default())
///         .unwrap();
/// assert!(analysis.report.passed);
/// ```
pub fn run_analysis(
    name: &str,
    text: &str,
    catalogue: &Catalogue,
    config: &Config,
) -> Result<Analysis, ParseError> {
    let instructions = parser::parse(text)?;
    let active = catalogue.filtered(|c| config.is_category_enabled(c));

    let Evaluation { findings, warnings } = evaluator::evaluate(&instructions, &active);
    let findings = reconcile::reconcile(findings, &active);
    let optimized = rewriter::optimize(&instructions, &findings, &active);

    let directives = instructions.iter().filter(|i| i.is_directive()).count();
    let stages = parser::stage_count(&instructions);
    let report = LintReport::from_findings(
        name,
        directives,
        stages,
        findings,
        warnings,
        config.strict.enabled,
    );

    Ok(Analysis { report, optimized })
}
