use std::fmt;

/// Severity of a finding, derived from its rule's category.
///
/// Variants are declared most severe first so that the derived `Ord`
/// sorts findings from worst to least via a plain ascending sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Closed set of rule categories. Every catalogue entry names one, and the
/// category alone determines the severity of its findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    #[serde(rename = "Base-Image Selection")]
    BaseImage,
    #[serde(rename = "Security")]
    Security,
    #[serde(rename = "Build Optimization")]
    BuildOptimization,
    #[serde(rename = "Maintainability")]
    Maintainability,
    #[serde(rename = "Dependency Management")]
    DependencyManagement,
    #[serde(rename = "CI/CD Practices")]
    CiCd,
}

impl Category {
    /// Fixed category → severity mapping.
    pub fn severity(&self) -> Severity {
        match self {
            Category::Security | Category::BaseImage => Severity::High,
            Category::BuildOptimization | Category::DependencyManagement => Severity::Medium,
            Category::Maintainability | Category::CiCd => Severity::Low,
        }
    }

    pub const ALL: [Category; 6] = [
        Category::BaseImage,
        Category::Security,
        Category::BuildOptimization,
        Category::Maintainability,
        Category::DependencyManagement,
        Category::CiCd,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::BaseImage => "Base-Image Selection",
            Category::Security => "Security",
            Category::BuildOptimization => "Build Optimization",
            Category::Maintainability => "Maintainability",
            Category::DependencyManagement => "Dependency Management",
            Category::CiCd => "CI/CD Practices",
        };
        write!(f, "{}", name)
    }
}

/// Whether a finding reports a problem, confirms a good practice, or flags
/// the absence of something the whole file should have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Violation,
    Confirmation,
    Absence,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Violation => write!(f, "violation"),
            Polarity::Confirmation => write!(f, "confirmation"),
            Polarity::Absence => write!(f, "absence"),
        }
    }
}

/// A single evaluated rule hit. The serialized field names are a stable
/// contract for the JSON output; downstream tooling keys on them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub suggestion: String,
    pub severity: Severity,
    pub line_number: usize,
    pub line_content: String,
    pub polarity: Polarity,
}

impl Finding {
    /// True for findings that count against the file (violations and
    /// absences); confirmations are good news and never fail a lint.
    pub fn is_issue(&self) -> bool {
        !matches!(self.polarity, Polarity::Confirmation)
    }
}

/// Non-fatal problem hit while evaluating one rule. The rule is skipped,
/// the rest of the catalogue still runs, and the warning rides on the
/// report so callers can surface it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuleWarning {
    pub rule_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintStatus {
    Passed,
    Warning,
    Failed,
}

#[derive(Debug, serde::Serialize)]
pub struct LintReport {
    pub file: String,
    pub analysis_timestamp: String,
    pub status: LintStatus,
    pub instructions_scanned: usize,
    pub stages: usize,
    pub findings: Vec<Finding>,
    pub warnings: Vec<RuleWarning>,
    pub passed: bool,
}

impl LintReport {
    pub fn from_findings(
        file: &str,
        instructions_scanned: usize,
        stages: usize,
        findings: Vec<Finding>,
        warnings: Vec<RuleWarning>,
        strict: bool,
    ) -> Self {
        let status = compute_status(&findings, strict);
        let passed = matches!(status, LintStatus::Passed);

        LintReport {
            file: file.to_string(),
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            status,
            instructions_scanned,
            stages,
            findings,
            warnings,
            passed,
        }
    }

    pub fn high_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.is_issue() && f.severity == Severity::High)
            .count()
    }

    pub fn medium_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.is_issue() && f.severity == Severity::Medium)
            .count()
    }

    pub fn low_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.is_issue() && f.severity == Severity::Low)
            .count()
    }

    pub fn confirmation_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.is_issue()).count()
    }

    /// Count high, medium, and low issues in a single pass.
    ///
    /// Returns `(high, medium, low)`, confirmations excluded. Prefer this
    /// over calling `high_count()` + `medium_count()` + `low_count()`
    /// separately when all three values are needed at the same time
    /// (e.g. JSON output).
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.findings
            .iter()
            .filter(|f| f.is_issue())
            .fold((0, 0, 0), |(h, m, l), f| match f.severity {
                Severity::High => (h + 1, m, l),
                Severity::Medium => (h, m + 1, l),
                Severity::Low => (h, m, l + 1),
            })
    }
}

fn compute_status(findings: &[Finding], strict: bool) -> LintStatus {
    // Single pass: track both flags simultaneously. Confirmations never
    // count against the file.
    let (has_high, has_medium) = findings
        .iter()
        .filter(|f| f.is_issue())
        .fold((false, false), |(h, m), f| match f.severity {
            Severity::High => (true, m),
            Severity::Medium => (h, true),
            Severity::Low => (h, m),
        });

    if has_high {
        LintStatus::Failed
    } else if has_medium {
        if strict {
            LintStatus::Failed
        } else {
            LintStatus::Warning
        }
    } else {
        LintStatus::Passed
    }
}
