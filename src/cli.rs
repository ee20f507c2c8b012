use clap::{Parser, Subcommand};
use dockfix::output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dockfix",
    version,
    about = "Best-practice linting and mechanical rewriting for Dockerfiles"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint a Dockerfile for best-practice violations
    Lint {
        /// Path to the Dockerfile
        path: PathBuf,

        /// Output format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Write output to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Treat medium-severity violations as errors
        #[arg(long)]
        strict: bool,

        /// JSON rule catalogue replacing the built-in one
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rewrite a Dockerfile, applying every mechanical fix
    Fix {
        /// Path to the Dockerfile
        path: PathBuf,

        /// Write the rewritten Dockerfile here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// JSON rule catalogue replacing the built-in one
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Lint every Dockerfile found under a directory
    #[command(name = "lint-all")]
    LintAll {
        /// Directory to search for Dockerfiles
        path: PathBuf,

        /// Output format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Treat medium-severity violations as errors
        #[arg(long)]
        strict: bool,

        /// JSON rule catalogue replacing the built-in one
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List all rules in the active catalogue
    ListRules {
        /// JSON rule catalogue replacing the built-in one
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Show full explanation for a rule
    Explain {
        /// Rule ID (e.g., "sec/root-user")
        rule_id: String,

        /// JSON rule catalogue replacing the built-in one
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}
