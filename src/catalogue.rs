//! Rule catalogue loading and compilation.
//!
//! A catalogue is an ordered JSON array of rule entries. Required keys per
//! entry: `title`, `category`, `regex_pattern`, `description`, `suggestion`.
//! Optional keys:
//!
//! | Key        | Meaning                                                        |
//! |------------|----------------------------------------------------------------|
//! | `id`       | Stable identifier; defaults to the position (`rule/007`)       |
//! | `unless`   | Exception pattern; suppresses a match on the same window        |
//! | `when`     | Gate pattern; the main pattern scans only the text after it     |
//! | `polarity` | `"violation"` (default) or `"confirmation"`                     |
//! | `subject`  | Pairing key for mutually exclusive violation/confirmation pairs |
//! | `absence`  | `true` for whole-file rules that fire when nothing matches      |
//! | `fix`      | Name of a mechanical fix the rewriter can apply                 |
//!
//! Loading is fail-fast: the first entry with a missing key, an
//! uncompilable pattern, or a duplicate id aborts the whole load. Patterns
//! compile with the `regex` crate; case-insensitivity is written as an
//! inline `(?i)` flag. A pattern whose source contains a line-break token
//! is matched against adjacent instruction pairs instead of single lines.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CatalogueError;
use crate::finding::{Category, Polarity};

/// Mechanical rewrites the optimizer knows how to apply. A catalogue entry
/// names one to mark its findings as auto-fixable; entries without a fix
/// are advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixKind {
    MergeRuns,
    NoInstallRecommends,
    AptCacheCleanup,
    CopyInsteadOfAdd,
    NonrootUser,
    AbsoluteWorkdir,
}

/// How a rule's pattern is applied to the instruction sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// One logical line at a time.
    SingleLine,
    /// Every adjacent pair of directives, joined with a newline.
    AdjacentPair,
    /// Once per file: fires when no directive matches the pattern.
    WholeFile,
}

/// One compiled catalogue entry. Severity is never stored here; it is
/// derived from the category when findings are built.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub suggestion: String,
    pub pattern: Regex,
    pub unless: Option<Regex>,
    pub when: Option<Regex>,
    pub scope: MatchScope,
    pub polarity: Polarity,
    pub subject: Option<String>,
    pub fix: Option<FixKind>,
}

/// Raw entry as written in the JSON file, before compilation.
#[derive(Debug, serde::Deserialize)]
struct RawRule {
    #[serde(default)]
    id: Option<String>,
    title: String,
    category: Category,
    regex_pattern: String,
    description: String,
    suggestion: String,
    #[serde(default)]
    unless: Option<String>,
    #[serde(default)]
    when: Option<String>,
    #[serde(default)]
    polarity: Option<Polarity>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    absence: bool,
    #[serde(default)]
    fix: Option<FixKind>,
}

static BUILTIN: LazyLock<Catalogue> = LazyLock::new(|| {
    // Compiles by construction; the test suite loads it the fallible way.
    Catalogue::load(include_str!("../rules/catalogue.json")).unwrap()
});

/// An immutable, ordered set of compiled rules. Loaded once per run;
/// never modified mid-evaluation.
#[derive(Debug, Clone)]
pub struct Catalogue {
    rules: Vec<Rule>,
}

impl Catalogue {
    /// Compile a catalogue from its JSON source.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogueError`] naming the first offending entry when
    /// the JSON is malformed, a required key is missing, a pattern does not
    /// compile, or two entries share an id.
    ///
    /// # Examples
    ///
    /// ```
    /// use dockfix::catalogue::Catalogue;
    ///
    /// let json = r#"[{
    ///     "id": "maint/run-cd",
    ///     "title": "Use WORKDIR instead of cd",
    ///     "category": "Maintainability",
    ///     "regex_pattern": "(?i)^\\s*RUN\\s+cd\\s",
    ///     "description": "Directory changes via cd are invisible to later instructions.",
    ///     "suggestion": "Replace RUN cd with a WORKDIR instruction."
    /// }]"#;
    ///
    /// let catalogue = Catalogue::load(json).unwrap();
    /// assert_eq!(catalogue.len(), 1);
    /// assert!(catalogue.get("maint/run-cd").is_some());
    /// ```
    pub fn load(json: &str) -> Result<Catalogue, CatalogueError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut rules = Vec::with_capacity(entries.len());
        let mut seen: HashSet<String> = HashSet::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let raw: RawRule = serde_json::from_value(entry)
                .map_err(|e| CatalogueError::InvalidEntry {
                    index,
                    reason: e.to_string(),
                })?;

            let id = match raw.id {
                Some(id) if id.trim().is_empty() => {
                    return Err(CatalogueError::InvalidEntry {
                        index,
                        reason: "id must not be empty".to_string(),
                    });
                }
                Some(id) => id,
                None => format!("rule/{index:03}"),
            };
            if !seen.insert(id.clone()) {
                return Err(CatalogueError::DuplicateId { index, id });
            }

            let pattern = compile(index, &id, "regex_pattern", &raw.regex_pattern)?;
            let unless = raw
                .unless
                .as_deref()
                .map(|p| compile(index, &id, "unless", p))
                .transpose()?;
            let when = raw
                .when
                .as_deref()
                .map(|p| compile(index, &id, "when", p))
                .transpose()?;

            let polarity = if raw.absence || raw.polarity == Some(Polarity::Absence) {
                Polarity::Absence
            } else {
                raw.polarity.unwrap_or(Polarity::Violation)
            };
            let scope = match polarity {
                Polarity::Absence => MatchScope::WholeFile,
                _ if crosses_lines(&raw.regex_pattern) => MatchScope::AdjacentPair,
                _ => MatchScope::SingleLine,
            };

            rules.push(Rule {
                id,
                title: raw.title,
                category: raw.category,
                description: raw.description,
                suggestion: raw.suggestion,
                pattern,
                unless,
                when,
                scope,
                polarity,
                subject: raw.subject,
                fix: raw.fix,
            });
        }

        Ok(Catalogue { rules })
    }

    /// The built-in catalogue embedded at compile time.
    pub fn builtin() -> &'static Catalogue {
        &BUILTIN
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Copy of this catalogue keeping only the rules whose category
    /// passes `keep`. Used for per-category config toggles.
    pub fn filtered<F>(&self, keep: F) -> Catalogue
    where
        F: Fn(Category) -> bool,
    {
        Catalogue {
            rules: self
                .rules
                .iter()
                .filter(|r| keep(r.category))
                .cloned()
                .collect(),
        }
    }
}

fn compile(
    index: usize,
    id: &str,
    field: &'static str,
    pattern: &str,
) -> Result<Regex, CatalogueError> {
    Regex::new(pattern).map_err(|e| CatalogueError::InvalidPattern {
        index,
        id: id.to_string(),
        field,
        source: Box::new(e),
    })
}

fn crosses_lines(pattern: &str) -> bool {
    // The line-break token may appear escaped (`\n` in the JSON source,
    // i.e. backslash-n after decoding) or as a literal newline character.
    pattern.contains("\\n") || pattern.contains('\n')
}
