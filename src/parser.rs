//! Dockerfile instruction parser.
//!
//! Physical lines are joined across unescaped trailing-backslash
//! continuations into logical instructions. Comment and blank lines are
//! retained as instructions of their own so later stages can map every
//! finding back to an exact physical line range; the parser never reorders
//! or drops lines. Unknown directives are tolerated and classified as
//! [`Keyword::Other`].

use crate::error::ParseError;

/// Directive kind of a logical line. Unknown directives map to `Other`;
/// the parser does not validate Dockerfile syntax beyond continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    From,
    Run,
    Cmd,
    Entrypoint,
    Copy,
    Add,
    Env,
    Arg,
    User,
    Workdir,
    Expose,
    Label,
    Volume,
    Healthcheck,
    Shell,
    StopSignal,
    Onbuild,
    Maintainer,
    Comment,
    Blank,
    Other,
}

impl Keyword {
    pub fn parse(token: &str) -> Keyword {
        match token.to_ascii_uppercase().as_str() {
            "FROM" => Keyword::From,
            "RUN" => Keyword::Run,
            "CMD" => Keyword::Cmd,
            "ENTRYPOINT" => Keyword::Entrypoint,
            "COPY" => Keyword::Copy,
            "ADD" => Keyword::Add,
            "ENV" => Keyword::Env,
            "ARG" => Keyword::Arg,
            "USER" => Keyword::User,
            "WORKDIR" => Keyword::Workdir,
            "EXPOSE" => Keyword::Expose,
            "LABEL" => Keyword::Label,
            "VOLUME" => Keyword::Volume,
            "HEALTHCHECK" => Keyword::Healthcheck,
            "SHELL" => Keyword::Shell,
            "STOPSIGNAL" => Keyword::StopSignal,
            "ONBUILD" => Keyword::Onbuild,
            "MAINTAINER" => Keyword::Maintainer,
            _ => Keyword::Other,
        }
    }
}

/// One logical Dockerfile directive after continuation-joining.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub keyword: Keyword,
    /// Raw text after the keyword token, un-tokenized beyond whitespace.
    pub arguments: String,
    /// Full reconstructed logical line, as matched by rules and emitted by
    /// the rewriter. Empty for blank lines.
    pub text: String,
    /// First and last physical line, 1-based, inclusive.
    pub source_line_range: (usize, usize),
    /// Ordinal of the build stage this instruction belongs to, 0-based.
    /// Lines before the first `FROM` share stage 0 with it.
    pub stage_index: usize,
    /// Alias of the enclosing stage, from `FROM ... AS <alias>`.
    pub stage_alias: Option<String>,
}

impl Instruction {
    /// First physical line of the instruction, 1-based. Findings anchor here.
    pub fn line(&self) -> usize {
        self.source_line_range.0
    }

    /// True for real directives. Comments and blanks only exist to keep
    /// line numbering 1:1 with the source file.
    pub fn is_directive(&self) -> bool {
        !matches!(self.keyword, Keyword::Comment | Keyword::Blank)
    }

    /// Build a one-line instruction from already-joined logical text.
    /// Used by the rewriter when emitting new or modified lines.
    pub(crate) fn from_logical(
        text: String,
        line: usize,
        stage_index: usize,
        stage_alias: Option<String>,
    ) -> Instruction {
        let trimmed = text.trim();
        let (keyword, arguments) = if trimmed.is_empty() {
            (Keyword::Blank, String::new())
        } else if trimmed.starts_with('#') {
            (Keyword::Comment, String::new())
        } else {
            split_keyword(trimmed)
        };
        Instruction {
            keyword,
            arguments,
            text: trimmed.to_string(),
            source_line_range: (line, line),
            stage_index,
            stage_alias,
        }
    }
}

/// Parse Dockerfile text into an ordered instruction sequence.
///
/// Fails only when the final physical line still expects a continuation.
/// A trailing run of backslashes of odd length continues the line; an even
/// run is an escaped backslash and does not. Comment and blank lines inside
/// a continuation are dropped from the joined text but counted in the line
/// range, matching how Docker itself reads them.
///
/// # Examples
///
/// ```
/// use dockfix::parser::{self, Keyword};
///
/// let text = "FROM ubuntu:24.04 AS build\nRUN make \\\n    install\n";
/// let instructions = parser::parse(text).unwrap();
/// assert_eq!(instructions.len(), 2);
/// assert_eq!(instructions[0].stage_alias.as_deref(), Some("build"));
/// assert_eq!(instructions[1].keyword, Keyword::Run);
/// assert_eq!(instructions[1].text, "RUN make install");
/// assert_eq!(instructions[1].source_line_range, (2, 3));
/// ```
pub fn parse(text: &str) -> Result<Vec<Instruction>, ParseError> {
    let physical: Vec<&str> = text.lines().collect();
    let mut instructions = Vec::new();
    let mut from_count = 0usize;
    let mut current_alias: Option<String> = None;

    let mut i = 0;
    while i < physical.len() {
        let start = i;
        let first = physical[i].trim();

        let (keyword, arguments, logical, end) = if first.is_empty() {
            i += 1;
            (Keyword::Blank, String::new(), String::new(), start)
        } else if first.starts_with('#') {
            i += 1;
            (Keyword::Comment, String::new(), first.to_string(), start)
        } else {
            let mut segments: Vec<String> = Vec::new();
            let mut current = first;
            loop {
                if ends_with_unescaped_backslash(current) {
                    let head = current[..current.len() - 1].trim_end();
                    if !head.is_empty() {
                        segments.push(head.to_string());
                    }
                    i += 1;
                    if i >= physical.len() {
                        return Err(ParseError::MalformedContinuation { line: i });
                    }
                    current = physical[i].trim();
                    while current.starts_with('#') || current.is_empty() {
                        i += 1;
                        if i >= physical.len() {
                            return Err(ParseError::MalformedContinuation { line: i });
                        }
                        current = physical[i].trim();
                    }
                } else {
                    if !current.is_empty() {
                        segments.push(current.to_string());
                    }
                    break;
                }
            }
            let end = i;
            i += 1;

            let logical = segments.join(" ");
            let (keyword, arguments) = split_keyword(&logical);
            (keyword, arguments, logical, end)
        };

        if keyword == Keyword::From {
            from_count += 1;
            current_alias = stage_alias_of(&arguments);
        }

        instructions.push(Instruction {
            keyword,
            arguments,
            text: logical,
            source_line_range: (start + 1, end + 1),
            stage_index: from_count.saturating_sub(1),
            stage_alias: current_alias.clone(),
        });
    }

    Ok(instructions)
}

/// Number of build stages, i.e. `FROM` instructions.
pub fn stage_count(instructions: &[Instruction]) -> usize {
    instructions
        .iter()
        .filter(|i| i.keyword == Keyword::From)
        .count()
}

fn split_keyword(logical: &str) -> (Keyword, String) {
    match logical.split_once(char::is_whitespace) {
        Some((head, rest)) => (Keyword::parse(head), rest.trim().to_string()),
        None => (Keyword::parse(logical), String::new()),
    }
}

fn ends_with_unescaped_backslash(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

fn stage_alias_of(arguments: &str) -> Option<String> {
    let mut tokens = arguments.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("as") {
            return tokens.next().map(str::to_string);
        }
    }
    None
}
