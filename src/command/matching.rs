//! Match classification and suggestion rendering.
//!
//! Matching an argument list against one command yields a three-way
//! classification. Invalid means structurally wrong (a literal did not
//! match, or there were more arguments than tokens with no greedy tail).
//! Partial means the shape fits but something is off: required tokens are
//! still missing, or a variable's content failed validation. Exact means
//! the command can execute. The split is what makes targeted suggestions
//! possible — "you typed the right command but the 3rd argument is
//! malformed" beats a blanket "command not found".

use tracing::debug;

use crate::error::{code, AmbiguousCommandError, ValidationError};
use crate::render::tag;
use crate::result::CommandResult;

use super::CommandId;

/// A validation failure recorded against one token while matching.
#[derive(Debug, Clone)]
pub struct TokenMismatch {
    /// Position of the token in the flattened chain.
    pub token_index: usize,
    /// Variable name the failure belongs to, if the token is named.
    pub field: Option<String>,
    /// The token's rendered label.
    pub token_label: String,
    /// The validation message.
    pub message: String,
    /// The raw argument that failed.
    pub value: String,
}

impl TokenMismatch {
    pub(crate) fn new(
        token_index: usize,
        token_label: String,
        error: ValidationError,
        value: &str,
    ) -> Self {
        Self {
            token_index,
            field: error.field.clone(),
            token_label,
            message: error.message,
            value: value.to_owned(),
        }
    }
}

/// How well an argument list fits one command.
#[derive(Debug, Clone)]
pub enum MatchKind {
    /// Structurally wrong command.
    Invalid,
    /// Right shape, but arguments are missing or malformed.
    Partial {
        /// Label of the first missing required token, if any.
        missing: Option<String>,
        /// Validation failures collected while scanning.
        mismatches: Vec<TokenMismatch>,
    },
    /// The command can execute with these arguments.
    Exact,
}

impl MatchKind {
    fn rank(&self) -> u8 {
        match self {
            MatchKind::Exact => 0,
            MatchKind::Partial { .. } => 1,
            MatchKind::Invalid => 2,
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            MatchKind::Exact => "Selected command",
            MatchKind::Partial { .. } => "Partial matching commands",
            MatchKind::Invalid => "Invalid commands",
        }
    }
}

/// One command's match outcome, with its labels captured for rendering.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    /// The matched command.
    pub id: CommandId,
    /// The command's tagged label.
    pub label: String,
    /// The label with mismatched optional tokens marked as errors, when
    /// mismatches were collected.
    pub error_label: Option<String>,
    /// The classification.
    pub kind: MatchKind,
}

impl CommandMatch {
    fn display_label(&self) -> &str {
        self.error_label.as_deref().unwrap_or(&self.label)
    }
}

/// The match outcomes of every executable command for one argument list.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matches: Vec<CommandMatch>,
}

impl MatchSet {
    pub(crate) fn new(matches: Vec<CommandMatch>) -> Self {
        Self { matches }
    }

    /// All recorded matches.
    pub fn matches(&self) -> &[CommandMatch] {
        &self.matches
    }

    fn suggestable(&self) -> Vec<&CommandMatch> {
        self.matches
            .iter()
            .filter(|m| matches!(m.kind, MatchKind::Exact | MatchKind::Partial { .. }))
            .collect()
    }

    /// Returns the unique exact match, if any.
    ///
    /// More than one exact match means two commands share an identical
    /// resolvable shape — a registration bug, reported as
    /// [`AmbiguousCommandError`] rather than a parse failure.
    pub fn exact(&self) -> Result<Option<&CommandMatch>, AmbiguousCommandError> {
        let exact: Vec<&CommandMatch> = self
            .matches
            .iter()
            .filter(|m| matches!(m.kind, MatchKind::Exact))
            .collect();
        match exact.len() {
            0 => Ok(None),
            1 => Ok(Some(exact[0])),
            _ => Err(AmbiguousCommandError {
                labels: exact
                    .iter()
                    .map(|m| crate::render::strip_tags(&m.label))
                    .collect(),
            }),
        }
    }

    /// Renders the full match set for simulate mode, grouped by match
    /// type. Invalid matches are discarded.
    pub fn describe(&self, args: &[String]) -> String {
        let mut lines = vec![
            "provided args:".to_owned(),
            format!("\t{}", args.join(" ")),
            String::new(),
        ];

        let mut ordered: Vec<&CommandMatch> = self
            .matches
            .iter()
            .filter(|m| !matches!(m.kind, MatchKind::Invalid))
            .collect();
        ordered.sort_by_key(|m| m.kind.rank());

        let mut current_rank = None;
        for matched in ordered {
            if current_rank != Some(matched.kind.rank()) {
                current_rank = Some(matched.kind.rank());
                lines.push(matched.kind.heading().to_owned());
            }
            lines.push(format!("\t{}", matched.display_label()));
        }

        lines.join("\n")
    }
}

/// Finds the matches worth suggesting, progressively dropping the last
/// argument when nothing matches — this discovers "you typed too much"
/// situations by finding what prefix of the input would have matched.
fn find_suggestable(
    set: &MatchSet,
    args: &[String],
    resolve: &dyn Fn(&[String]) -> MatchSet,
) -> (Vec<CommandMatch>, bool) {
    let direct: Vec<CommandMatch> = set.suggestable().into_iter().cloned().collect();
    if !direct.is_empty() {
        return (direct, false);
    }

    let mut current = args;
    while current.len() >= 2 {
        current = &current[..current.len() - 1];
        debug!(prefix = ?current, "retrying suggestion with shortened input");
        let shrunk = resolve(current);
        let candidates: Vec<CommandMatch> =
            shrunk.suggestable().into_iter().cloned().collect();
        if !candidates.is_empty() {
            return (candidates, true);
        }
    }

    (Vec::new(), false)
}

/// Renders the no-exact-match outcome as a failed result.
///
/// A single partial match with no mismatches reads as "insufficient
/// arguments"; a single exact match found by shrinking reads as "too many
/// arguments"; a single partial match with mismatches lists each failure;
/// anything else lists the candidate labels.
pub fn suggest(
    args: &[String],
    set: &MatchSet,
    resolve: &dyn Fn(&[String]) -> MatchSet,
) -> CommandResult {
    let header = format!("Could not find the command for \"{}\"", args.join(" "));
    let (candidates, shrunk) = find_suggestable(set, args, resolve);

    if candidates.len() == 1 {
        let candidate = &candidates[0];
        match &candidate.kind {
            MatchKind::Partial { mismatches, .. } if !mismatches.is_empty() => {
                let mut lines = vec![format!(
                    "Invalid arguments for \"{}\"",
                    crate::render::strip_tags(&candidate.label)
                )];
                for mismatch in mismatches {
                    let name = mismatch
                        .field
                        .clone()
                        .unwrap_or_else(|| crate::render::strip_tags(&mismatch.token_label));
                    lines.push(format!(
                        "\t{}: {} (got \"{}\")",
                        tag::error(name.to_uppercase()),
                        mismatch.message,
                        mismatch.value
                    ));
                }
                return CommandResult::fail(lines.join("\n"))
                    .with_code(code::INVALID_ARGUMENT_FORMAT);
            }
            MatchKind::Partial { .. } => {
                return CommandResult::fail(format!(
                    "{header}\nInsufficient arguments, usage:\n\t{}",
                    candidate.label
                ))
                .with_code(code::INVALID_COMMAND);
            }
            MatchKind::Exact if shrunk => {
                return CommandResult::fail(format!(
                    "{header}\nToo many arguments, usage:\n\t{}",
                    candidate.label
                ))
                .with_code(code::INVALID_COMMAND);
            }
            _ => {}
        }
    }

    if candidates.is_empty() {
        return CommandResult::fail(header).with_code(code::INVALID_COMMAND);
    }

    let mut lines = vec![header, "Did you mean one of:".to_owned()];
    for candidate in &candidates {
        lines.push(format!("\t{}", candidate.display_label()));
    }
    CommandResult::fail(lines.join("\n")).with_code(code::INVALID_COMMAND)
}
