//! # dockfix
//!
//! Best-practice linting and mechanical rewriting for Dockerfiles.
//!
//! `dockfix` parses a Dockerfile into logical instructions, evaluates a
//! regex-driven rule catalogue against them in parallel, reconciles the raw
//! matches into an ordered report, and emits a rewritten Dockerfile with
//! every mechanical fix applied. Reports render as human-readable text,
//! JSON, CSV, or [SARIF].
//!
//! ## Quick start
//!
//! ```rust
//! use dockfix::{analysis, catalogue::Catalogue, config::Config, output};
//!
//! let text = "FROM ubuntu:latest\nRUN apt-get update\nUSER root\n";
//! let analysis = analysis::run_analysis(
//!     "Dockerfile",
//!     text,
//!     Catalogue::builtin(),
//!     &Config::default(),
//! )
//! .expect("malformed continuation");
//!
//! if analysis.report.passed {
//!     println!("Lint passed!");
//! } else {
//!     let report = output::format_report(&analysis.report, &output::OutputFormat::Pretty);
//!     print!("{report}");
//!     print!("{}", analysis.optimized.content);
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline:
//!
//! 1. **[`parser`]** — split raw text into logical instructions with stage
//!    and line-range bookkeeping.
//! 2. **[`catalogue`]** — load and compile the JSON rule catalogue
//!    ([`catalogue::Rule`], [`catalogue::Catalogue`]).
//! 3. **[`evaluator`]** — run every rule over the instruction stream in
//!    parallel, deterministically ordered.
//! 4. **[`reconcile`]** — suppress paired confirmations, dedup, and order
//!    findings by severity.
//! 5. **[`rewriter`]** — apply mechanical fixes and advisory comments to
//!    produce the optimized Dockerfile.
//! 6. **[`finding`]** — core data types ([`finding::Finding`], [`finding::LintReport`]).
//! 7. **[`output`]** — format reports as pretty text, JSON, CSV, or SARIF.
//!
//! [`analysis::run_analysis`] wires the stages together; [`config`] carries
//! the TOML knobs (strict mode, per-category toggles, catalogue override).
//!
//! ## Rule categories
//!
//! | Category | Severity | Concern |
//! |----------|----------|---------|
//! | Security | high | root users, sensitive ports, writable image paths |
//! | Base-Image Selection | high | `latest` and missing tags |
//! | Build Optimization | medium | layer count, build context hygiene |
//! | Dependency Management | medium | package installation hygiene |
//! | Maintainability | low | readability and portability conventions |
//! | CI/CD Practices | low | multi-stage build conventions |
//!
//! [SARIF]: https://sarifweb.azurewebsites.net/

pub mod analysis;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod finding;
pub mod output;
pub mod parser;
pub mod reconcile;
pub mod rewriter;
