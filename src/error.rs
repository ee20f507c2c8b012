//! Error types for the parsing and catalogue-loading stages.
//!
//! Both are fatal: a parse error aborts the run for that file, a catalogue
//! error aborts before any file is read. Per-rule evaluation problems are
//! deliberately *not* here — they are recovered locally and surfaced as
//! [`RuleWarning`](crate::finding::RuleWarning)s on the report.

use thiserror::Error;

/// Fatal error while turning Dockerfile text into instructions.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line} ends with a line continuation but no line follows")]
    MalformedContinuation { line: usize },
}

/// Fatal error while loading or compiling the rule catalogue.
///
/// The load is fail-fast: the first offending entry aborts the whole
/// catalogue, identified by its zero-based position and, where known, its id.
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("catalogue is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("rule {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("rule {index} ({id}): `{field}` does not compile: {source}")]
    InvalidPattern {
        index: usize,
        id: String,
        field: &'static str,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("rule {index} ({id}): duplicate rule id")]
    DuplicateId { index: usize, id: String },
}
