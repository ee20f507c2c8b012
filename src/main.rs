mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use dockfix::{
    analysis::{self, Analysis},
    catalogue::{Catalogue, FixKind},
    config::Config,
    finding::{Category, LintReport, Severity},
    output,
    rewriter::OptimizedDockerfile,
};
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lint {
            path,
            format,
            output: output_path,
            strict,
            rules,
            config: config_path,
        } => {
            let config = load_config(config_path.as_deref(), strict);
            let catalogue = load_catalogue(rules.as_deref(), &config);
            let text = read_dockerfile(&path);
            let analysis = run_or_exit(&path, &text, &catalogue, &config);

            let formatted = output::format_report(&analysis.report, &format);
            if let Some(out_path) = output_path {
                std::fs::write(&out_path, &formatted).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {e}");
                    std::process::exit(2);
                });
                eprintln!("Output written to {}", out_path.display());
            } else {
                print!("{formatted}");
            }

            std::process::exit(if analysis.report.passed { 0 } else { 1 });
        }

        Commands::Fix {
            path,
            output: output_path,
            rules,
            config: config_path,
        } => {
            let config = load_config(config_path.as_deref(), false);
            let catalogue = load_catalogue(rules.as_deref(), &config);
            let text = read_dockerfile(&path);
            let analysis = run_or_exit(&path, &text, &catalogue, &config);

            if let Some(out_path) = output_path {
                std::fs::write(&out_path, &analysis.optimized.content).unwrap_or_else(|e| {
                    eprintln!("Error writing {}: {e}", out_path.display());
                    std::process::exit(2);
                });
                eprintln!("Rewritten Dockerfile written to {}", out_path.display());
            } else {
                print!("{}", analysis.optimized.content);
            }

            // Summary on stderr so `dockfix fix f > out` captures only the
            // rewritten Dockerfile.
            eprint!("{}", format_fix_summary(&analysis.optimized));

            std::process::exit(if analysis.report.passed { 0 } else { 1 });
        }

        Commands::LintAll {
            path,
            format,
            strict,
            rules,
            config: config_path,
        } => {
            if !path.exists() {
                eprintln!("Error: path does not exist: {}", path.display());
                std::process::exit(2);
            }

            let config = load_config(config_path.as_deref(), strict);
            let catalogue = load_catalogue(rules.as_deref(), &config);

            let files = find_dockerfiles(&path);
            if files.is_empty() {
                eprintln!("Error: no Dockerfiles found under '{}'", path.display());
                std::process::exit(2);
            }

            let mut reports: Vec<LintReport> = Vec::new();
            for file in &files {
                let text = read_dockerfile(file);
                let analysis = run_or_exit(file, &text, &catalogue, &config);
                print!("{}", output::format_report(&analysis.report, &format));
                reports.push(analysis.report);
            }

            // Print collection summary for pretty format
            if matches!(format, output::OutputFormat::Pretty) {
                print!("{}", format_collection_summary(&path, &reports));
            }

            let all_passed = reports.iter().all(|r| r.passed);
            std::process::exit(if all_passed { 0 } else { 1 });
        }

        Commands::ListRules { rules } => {
            let catalogue = load_catalogue(rules.as_deref(), &Config::default());
            println!("{}", "Rule Catalogue".bold().underline());
            println!();

            for category in Category::ALL {
                let mut in_category = catalogue
                    .rules()
                    .iter()
                    .filter(|r| r.category == category)
                    .peekable();
                if in_category.peek().is_none() {
                    continue;
                }

                println!("  {}", category.to_string().bold());
                for rule in in_category {
                    let severity = match rule.category.severity() {
                        Severity::High => "HIGH".red().bold().to_string(),
                        Severity::Medium => " MED".yellow().bold().to_string(),
                        Severity::Low => " LOW".blue().to_string(),
                    };

                    println!(
                        "    [{severity}] {id:<28} {title}",
                        id = rule.id,
                        title = rule.title,
                    );
                }
                println!();
            }

            println!("  Total: {} rules", catalogue.len());
        }

        Commands::Explain { rule_id, rules } => {
            let catalogue = load_catalogue(rules.as_deref(), &Config::default());
            match catalogue.get(&rule_id) {
                Some(rule) => {
                    println!("{}", rule.id.bold());
                    println!();
                    println!("  Title:        {}", rule.title);
                    println!("  Category:     {}", rule.category);
                    println!("  Severity:     {}", rule.category.severity());
                    println!("  Polarity:     {}", rule.polarity);
                    println!("  Description:  {}", rule.description);
                    println!("  Suggestion:   {}", rule.suggestion);
                    if let Some(kind) = rule.fix {
                        println!("  Mechanical fix: {}", describe_fix(kind));
                    }
                }
                None => {
                    eprintln!("Unknown rule: {rule_id}");
                    eprintln!("Use 'dockfix list-rules' to see all available rules.");
                    std::process::exit(2);
                }
            }
        }
    }
}

fn load_config(path: Option<&Path>, strict: bool) -> Config {
    let mut config = Config::load(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    if strict {
        config.strict.enabled = true;
    }
    config
}

/// Resolves the active catalogue: `--rules` flag, then the config file's
/// `catalogue.path`, then the compiled-in default.
fn load_catalogue(rules: Option<&Path>, config: &Config) -> Catalogue {
    let path = rules.or(config.catalogue.path.as_deref());
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).unwrap_or_else(|e| {
                eprintln!("Error reading catalogue {}: {e}", p.display());
                std::process::exit(2);
            });
            Catalogue::load(&content).unwrap_or_else(|e| {
                eprintln!("Error in catalogue {}: {e}", p.display());
                std::process::exit(2);
            })
        }
        None => Catalogue::builtin().clone(),
    }
}

fn read_dockerfile(path: &Path) -> String {
    if !path.exists() {
        eprintln!("Error: path does not exist: {}", path.display());
        std::process::exit(2);
    }
    if path.is_dir() {
        eprintln!(
            "Error: '{}' is a directory, not a Dockerfile.",
            path.display()
        );
        eprintln!();
        eprintln!("To lint every Dockerfile underneath it:");
        eprintln!("  dockfix lint-all {}", path.display());
        std::process::exit(2);
    }
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        std::process::exit(2);
    })
}

fn run_or_exit(path: &Path, text: &str, catalogue: &Catalogue, config: &Config) -> Analysis {
    let name = path.display().to_string();
    analysis::run_analysis(&name, text, catalogue, config).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {e}", path.display());
        std::process::exit(2);
    })
}

/// Recursively collects Dockerfiles under `path`: files named `Dockerfile`
/// or `Dockerfile.<suffix>`, plus `*.dockerfile`, sorted by path.
fn find_dockerfiles(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_dockerfile_name(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

fn is_dockerfile_name(name: &str) -> bool {
    name == "Dockerfile" || name.starts_with("Dockerfile.") || name.ends_with(".dockerfile")
}

fn describe_fix(kind: FixKind) -> &'static str {
    match kind {
        FixKind::MergeRuns => "merge consecutive RUN instructions into one layer",
        FixKind::NoInstallRecommends => "append --no-install-recommends to apt-get install",
        FixKind::AptCacheCleanup => "append apt list cleanup to the same layer",
        FixKind::CopyInsteadOfAdd => "replace ADD with COPY",
        FixKind::NonrootUser => "switch to a numeric non-root USER",
        FixKind::AbsoluteWorkdir => "anchor the WORKDIR path at /",
    }
}

/// Renders the applied/unresolved breakdown printed to stderr after a fix.
fn format_fix_summary(optimized: &OptimizedDockerfile) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!("{}\n", "Applied fixes".bold().underline()));
    if optimized.applied_fixes.is_empty() {
        out.push_str(&format!("  {}\n", "none".dimmed()));
    }
    for finding in &optimized.applied_fixes {
        out.push_str(&format!(
            "  [{tag}] line {line:<4} {rule_id:<28} {title}\n",
            tag = "FIXED".green().bold(),
            line = finding.line_number,
            rule_id = finding.rule_id.dimmed(),
            title = finding.title,
        ));
    }

    let mut unresolved = optimized
        .unresolved_findings
        .iter()
        .filter(|f| f.is_issue())
        .peekable();
    if unresolved.peek().is_some() {
        out.push_str(&format!("{}\n", "Needs attention".bold().underline()));
        for finding in unresolved {
            out.push_str(&format!(
                "  [{tag}] line {line:<4} {rule_id:<28} {suggestion}\n",
                tag = " TODO".yellow().bold(),
                line = finding.line_number,
                rule_id = finding.rule_id.dimmed(),
                suggestion = finding.suggestion,
            ));
        }
    }

    out
}

/// Renders a compact summary table after all individual file reports have been printed.
fn format_collection_summary(root: &Path, reports: &[LintReport]) -> String {
    use dockfix::finding::LintStatus;

    let mut out = String::new();
    let separator = "─".repeat(60);

    out.push('\n');
    out.push_str(&format!(
        "{}\n",
        format!(
            "  Collection Summary: {}  ({} Dockerfiles)",
            root.display(),
            reports.len()
        )
        .bold()
        .underline()
    ));
    out.push_str(&format!("{}\n", separator.dimmed()));

    let mut n_failed = 0usize;
    let mut n_warned = 0usize;
    let mut n_passed = 0usize;

    for report in reports {
        let (icon, status_str) = match report.status {
            LintStatus::Passed => {
                n_passed += 1;
                (
                    "✓".green().to_string(),
                    "PASSED ".green().bold().to_string(),
                )
            }
            LintStatus::Warning => {
                n_warned += 1;
                (
                    "⚠".yellow().to_string(),
                    "WARNING".yellow().bold().to_string(),
                )
            }
            LintStatus::Failed => {
                n_failed += 1;
                ("✗".red().to_string(), "FAILED ".red().bold().to_string())
            }
        };

        let (high, medium, low) = report.count_by_severity();
        out.push_str(&format!(
            "  {icon}  {name:<30} {status}  {h}h {m}m {l}l\n",
            name = report.file,
            status = status_str,
            h = high,
            m = medium,
            l = low,
        ));
    }

    out.push_str(&format!("{}\n", separator.dimmed()));
    out.push_str(&format!(
        "  Total: {}  {}  {}\n",
        format!("{} failed", n_failed).red().bold(),
        format!("{} warnings", n_warned).yellow().bold(),
        format!("{} passed", n_passed).green().bold(),
    ));

    out
}
