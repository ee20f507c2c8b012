//! Mechanical Dockerfile rewriting driven by the reconciled findings.
//!
//! Only fixes that need no human judgment are applied in place:
//!
//! | Fix                   | Rewrite                                            |
//! |-----------------------|----------------------------------------------------|
//! | `merge-runs`          | Join a run of consecutive `RUN`s with `&&`         |
//! | `no-install-recommends` | Insert the flag after `apt-get install`          |
//! | `apt-cache-cleanup`   | Append `rm -rf /var/lib/apt/lists/*` to the `RUN`  |
//! | `copy-instead-of-add` | Replace the `ADD` keyword with `COPY`              |
//! | `nonroot-user`        | Replace `USER root` / insert a generated user      |
//! | `absolute-workdir`    | Prefix the relative path with `/`                  |
//!
//! Everything else is judgment-requiring (version pins, package removal,
//! base-image choice) and is left as a `# dockfix:` comment above the
//! instruction, recorded in `unresolved_findings`; the rewriter never
//! guesses a version string or drops a dependency.
//!
//! The walk is stage-by-stage: the generated non-root user block only goes
//! into the last stage, before its final `CMD`/`ENTRYPOINT`, so a fix
//! cannot leak into another stage's final user. One pass reaches a fixed
//! point: a second optimize over the rewritten instructions applies no
//! further mechanical fixes. Output is emitted one line per logical
//! instruction; original continuation formatting is not preserved.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalogue::{Catalogue, FixKind};
use crate::finding::{Finding, Polarity};
use crate::parser::{self, Instruction, Keyword};

static RE_APT_INSTALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bapt-get\s+(?:-[\w=-]+\s+)*install\b").unwrap());
static RE_RUN_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^RUN\s+").unwrap());
static RE_ADD_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^ADD\b").unwrap());
static RE_WORKDIR_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(WORKDIR\s+)(\S)").unwrap());

/// The generated user is a plain numeric uid: it needs no `useradd` layer,
/// so applying it cannot create a new `RUN` for the merge rule to chew on.
const NONROOT_USER: &str = "USER 10001";
const INSERT_COMMENT: &str = "# dockfix: run as a non-root user";
// Must not quote the offending directive: consumers grep the rewritten
// file for `USER root` to confirm it is gone.
const REPLACE_COMMENT: &str = "# dockfix: replaced the root user with a non-root user";
const ADVISORY_PREFIX: &str = "# dockfix: ";
const APT_LISTS_CLEANUP: &str = "rm -rf /var/lib/apt/lists/*";

/// The rewritten Dockerfile plus the bookkeeping of what was and was not
/// fixed. Stage count and order always equal the source's.
#[derive(Debug)]
pub struct OptimizedDockerfile {
    /// Full rewritten text, one line per logical instruction.
    pub content: String,
    /// Rewritten instruction sequence.
    pub instructions: Vec<Instruction>,
    /// Findings whose fix was applied in place.
    pub applied_fixes: Vec<Finding>,
    /// Findings left to the user: advisory comments and fixes that did not
    /// apply. Confirmations appear in neither list.
    pub unresolved_findings: Vec<Finding>,
}

/// Apply the mechanical subset of `findings` to the instruction sequence.
pub fn optimize(
    instructions: &[Instruction],
    findings: &[Finding],
    catalogue: &Catalogue,
) -> OptimizedDockerfile {
    // Several rules can demand the same fix on the same line; every bucket
    // holds all of them so each finding still lands in exactly one of
    // applied_fixes and unresolved_findings.
    let mut fixes_by_line: HashMap<usize, Vec<(Finding, FixKind)>> = HashMap::new();
    let mut merge_findings: HashMap<usize, Vec<Finding>> = HashMap::new();
    let mut advisories_by_line: HashMap<usize, Vec<Finding>> = HashMap::new();
    let mut insert_user: Vec<Finding> = Vec::new();
    let mut applied: Vec<Finding> = Vec::new();
    let mut unresolved: Vec<Finding> = Vec::new();

    for finding in findings {
        if finding.polarity == Polarity::Confirmation {
            continue;
        }
        match catalogue.get(&finding.rule_id).and_then(|r| r.fix) {
            Some(FixKind::MergeRuns) => {
                merge_findings
                    .entry(finding.line_number)
                    .or_default()
                    .push(finding.clone());
            }
            Some(FixKind::NonrootUser) if finding.polarity == Polarity::Absence => {
                insert_user.push(finding.clone());
            }
            Some(kind) => {
                fixes_by_line
                    .entry(finding.line_number)
                    .or_default()
                    .push((finding.clone(), kind));
            }
            None => {
                advisories_by_line
                    .entry(finding.line_number)
                    .or_default()
                    .push(finding.clone());
            }
        }
    }

    let last_stage = parser::stage_count(instructions).saturating_sub(1);
    let insert_at: Option<usize> = if insert_user.is_empty() {
        None
    } else {
        instructions
            .iter()
            .enumerate()
            .filter(|(_, ins)| {
                ins.stage_index == last_stage
                    && matches!(ins.keyword, Keyword::Cmd | Keyword::Entrypoint)
            })
            .map(|(i, _)| i)
            .last()
    };

    // For every instruction, the index of the next real directive after it.
    let next_directive: Vec<Option<usize>> = {
        let mut next = vec![None; instructions.len()];
        let mut upcoming: Option<usize> = None;
        for i in (0..instructions.len()).rev() {
            next[i] = upcoming;
            if instructions[i].is_directive() {
                upcoming = Some(i);
            }
        }
        next
    };

    let mut emitter = Emitter::default();
    let mut i = 0;
    while i < instructions.len() {
        if insert_at == Some(i) {
            let ins = &instructions[i];
            emit_user_block(
                &mut emitter,
                ins.stage_index,
                ins.stage_alias.clone(),
                INSERT_COMMENT,
            );
        }

        let ins = &instructions[i];

        let starts_merge_group = ins.keyword == Keyword::Run
            && merge_findings.contains_key(&ins.line())
            && next_directive[i].is_some_and(|j| instructions[j].keyword == Keyword::Run);
        if starts_merge_group {
            i = emit_merged_group(
                &mut emitter,
                instructions,
                i,
                &next_directive,
                &mut merge_findings,
                &mut fixes_by_line,
                &mut advisories_by_line,
                &mut applied,
                &mut unresolved,
            );
            continue;
        }

        let replaces_user = ins.keyword == Keyword::User
            && fixes_by_line
                .get(&ins.line())
                .is_some_and(|fixes| fixes.iter().any(|(_, k)| *k == FixKind::NonrootUser));
        if replaces_user {
            if let Some(fixes) = fixes_by_line.remove(&ins.line()) {
                for (finding, kind) in fixes {
                    if kind == FixKind::NonrootUser {
                        applied.push(finding);
                    } else {
                        unresolved.push(finding);
                    }
                }
            }
            if let Some(list) = advisories_by_line.remove(&ins.line()) {
                unresolved.extend(list);
            }
            emit_user_block(
                &mut emitter,
                ins.stage_index,
                ins.stage_alias.clone(),
                REPLACE_COMMENT,
            );
            i += 1;
            continue;
        }

        let (text, modified) =
            apply_line_fixes(ins, &mut fixes_by_line, &mut applied, &mut unresolved);

        // Advisory comments go directly above the instruction. When a fix
        // rewrote the instruction this pass, its advisories were computed
        // on the old text and may no longer hold, so they stay unresolved
        // without a comment.
        if let Some(list) = advisories_by_line.remove(&ins.line()) {
            if modified {
                unresolved.extend(list);
            } else {
                for finding in list {
                    let comment = format!("{ADVISORY_PREFIX}{}", finding.suggestion);
                    // Several advisories can stack above one instruction, so
                    // scan the whole contiguous comment block, not just the
                    // previous line.
                    let already_present = instructions[..i]
                        .iter()
                        .rev()
                        .take_while(|p| p.keyword == Keyword::Comment)
                        .any(|p| p.text == comment);
                    if !already_present {
                        emitter.push(comment, ins.stage_index, ins.stage_alias.clone());
                    }
                    unresolved.push(finding);
                }
            }
        }

        emitter.push(text, ins.stage_index, ins.stage_alias.clone());
        i += 1;
    }

    if !insert_user.is_empty() {
        if insert_at.is_none() {
            let (stage, alias) = instructions
                .last()
                .map(|ins| (ins.stage_index, ins.stage_alias.clone()))
                .unwrap_or((0, None));
            emit_user_block(&mut emitter, stage, alias, INSERT_COMMENT);
        }
        applied.extend(insert_user);
    }

    // Anything still unclaimed had no instruction to attach to.
    for (_, fixes) in fixes_by_line {
        unresolved.extend(fixes.into_iter().map(|(f, _)| f));
    }
    for (_, list) in advisories_by_line {
        unresolved.extend(list);
    }
    unresolved.extend(merge_findings.into_values().flatten());

    sort_findings(&mut applied);
    sort_findings(&mut unresolved);

    let content = if emitter.out.is_empty() {
        String::new()
    } else {
        let mut joined = emitter
            .out
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        joined.push('\n');
        joined
    };

    OptimizedDockerfile {
        content,
        instructions: emitter.out,
        applied_fixes: applied,
        unresolved_findings: unresolved,
    }
}

/// Collects rewritten instructions, renumbering lines as it goes.
#[derive(Default)]
struct Emitter {
    out: Vec<Instruction>,
}

impl Emitter {
    fn push(&mut self, text: String, stage_index: usize, stage_alias: Option<String>) {
        let line = self.out.len() + 1;
        self.out
            .push(Instruction::from_logical(text, line, stage_index, stage_alias));
    }
}

fn emit_user_block(
    emitter: &mut Emitter,
    stage_index: usize,
    stage_alias: Option<String>,
    comment: &str,
) {
    emitter.push(comment.to_string(), stage_index, stage_alias.clone());
    emitter.push(NONROOT_USER.to_string(), stage_index, stage_alias);
}

/// Emit one maximal group of consecutive `RUN`s as a single merged `RUN`,
/// applying each member's own line fixes first. Comments and blank lines
/// inside the group float above the merged instruction. Returns the index
/// just past the group.
#[allow(clippy::too_many_arguments)]
fn emit_merged_group(
    emitter: &mut Emitter,
    instructions: &[Instruction],
    start: usize,
    next_directive: &[Option<usize>],
    merge_findings: &mut HashMap<usize, Vec<Finding>>,
    fixes_by_line: &mut HashMap<usize, Vec<(Finding, FixKind)>>,
    advisories_by_line: &mut HashMap<usize, Vec<Finding>>,
    applied: &mut Vec<Finding>,
    unresolved: &mut Vec<Finding>,
) -> usize {
    // Chain as long as the last member anchors a merge finding and the
    // next directive is another RUN. Merging the whole group at once is
    // what makes a single pass reach the fixed point.
    let mut members = vec![start];
    let mut last = start;
    while merge_findings.contains_key(&instructions[last].line()) {
        match next_directive[last] {
            Some(j) if instructions[j].keyword == Keyword::Run => {
                if let Some(anchored) = merge_findings.remove(&instructions[last].line()) {
                    applied.extend(anchored);
                }
                members.push(j);
                last = j;
            }
            _ => break,
        }
    }

    let mut parts: Vec<String> = Vec::new();
    for idx in start..=last {
        let ins = &instructions[idx];
        if members.contains(&idx) {
            let (text, _) = apply_line_fixes(ins, fixes_by_line, applied, unresolved);
            if let Some(list) = advisories_by_line.remove(&ins.line()) {
                // Computed on the pre-merge lines; do not comment the
                // merged instruction with them.
                unresolved.extend(list);
            }
            if idx == start {
                parts.push(text);
            } else {
                parts.push(RE_RUN_PREFIX.replace(&text, "").into_owned());
            }
        } else {
            emitter.push(ins.text.clone(), ins.stage_index, ins.stage_alias.clone());
        }
    }

    let stage = instructions[start].stage_index;
    let alias = instructions[start].stage_alias.clone();
    emitter.push(parts.join(" && "), stage, alias);
    last + 1
}

fn apply_line_fixes(
    ins: &Instruction,
    fixes_by_line: &mut HashMap<usize, Vec<(Finding, FixKind)>>,
    applied: &mut Vec<Finding>,
    unresolved: &mut Vec<Finding>,
) -> (String, bool) {
    let mut text = ins.text.clone();
    let mut modified = false;
    if let Some(fixes) = fixes_by_line.remove(&ins.line()) {
        for (finding, kind) in fixes {
            match apply_fix(kind, ins.keyword, &text) {
                Some(new_text) => {
                    text = new_text;
                    modified = true;
                    applied.push(finding);
                }
                None => unresolved.push(finding),
            }
        }
    }
    (text, modified)
}

fn apply_fix(kind: FixKind, keyword: Keyword, text: &str) -> Option<String> {
    match kind {
        FixKind::NoInstallRecommends if keyword == Keyword::Run => {
            if RE_APT_INSTALL.is_match(text) && !text.contains("--no-install-recommends") {
                Some(
                    RE_APT_INSTALL
                        .replace_all(text, "${0} --no-install-recommends")
                        .into_owned(),
                )
            } else {
                None
            }
        }
        FixKind::AptCacheCleanup if keyword == Keyword::Run => {
            Some(format!("{text} && {APT_LISTS_CLEANUP}"))
        }
        FixKind::CopyInsteadOfAdd if keyword == Keyword::Add => {
            Some(RE_ADD_PREFIX.replace(text, "COPY").into_owned())
        }
        FixKind::AbsoluteWorkdir if keyword == Keyword::Workdir => {
            Some(RE_WORKDIR_PATH.replace(text, "${1}/${2}").into_owned())
        }
        // merge-runs and nonroot-user are handled structurally by the
        // caller; a kind that does not match its keyword stays unresolved.
        _ => None,
    }
}

fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (a.severity, a.line_number, &a.rule_id, &a.suggestion).cmp(&(
            b.severity,
            b.line_number,
            &b.rule_id,
            &b.suggestion,
        ))
    });
}
