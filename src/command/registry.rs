//! Arena storage for registered commands.
//!
//! All commands live in one vector addressed through stable [`CommandId`]s.
//! Parent chains are resolved by an iterative walk to the root followed by
//! reverse concatenation, so `all_tokens(child) == all_tokens(parent) ++
//! own_tokens(child)` holds across any nesting depth without recursion.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CommandError, Result};
use crate::inject::Injection;
use crate::render::strip_tags;
use crate::token::Token;

use super::matching::{CommandMatch, MatchKind, MatchSet, TokenMismatch};
use super::{Command, CommandId, Group};

/// Owner of all registered commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<CommandId, usize>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a validated command and returns its handle.
    pub(crate) fn insert(&mut self, command: Command) -> Result<CommandId> {
        if let Some(parent) = command.parent {
            if !self.index.contains_key(&parent) {
                return Err(CommandError::configuration(
                    "parent command is not registered",
                ));
            }
        }
        for token in &command.tokens {
            if token.is_variable() && token.name().is_some_and(str::is_empty) {
                return Err(CommandError::configuration(
                    "variable tokens must carry a name",
                ));
            }
        }

        let id = command.id;
        self.index.insert(id, self.commands.len());
        self.commands.push(command);
        if let Err(err) = self.validate_chain(id) {
            self.index.remove(&id);
            self.commands.pop();
            return Err(err);
        }
        debug!(?id, commands = self.commands.len(), "registered command");
        Ok(id)
    }

    /// Returns the command behind a handle.
    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.index.get(&id).map(|&position| &self.commands[position])
    }

    fn expect(&self, id: CommandId) -> &Command {
        self.get(id).expect("command id is valid for this registry")
    }

    /// Iterates all commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the chain of ids from the root ancestor down to `id`.
    fn chain(&self, id: CommandId) -> Vec<CommandId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.expect(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// The command's effective token chain: parents first, own tokens last.
    pub fn all_tokens(&self, id: CommandId) -> Vec<&Token> {
        self.chain(id)
            .into_iter()
            .flat_map(|ancestor| self.expect(ancestor).tokens.iter())
            .collect()
    }

    /// The command's effective injections: parents first, own last.
    pub fn all_injections(&self, id: CommandId) -> Vec<&Injection> {
        self.chain(id)
            .into_iter()
            .flat_map(|ancestor| self.expect(ancestor).injections.iter())
            .collect()
    }

    /// The command's group, falling back to the nearest ancestor's.
    pub fn effective_group(&self, id: CommandId) -> Option<&Group> {
        let mut current = Some(id);
        while let Some(id) = current {
            let command = self.expect(id);
            if let Some(group) = &command.group {
                return Some(group);
            }
            current = command.parent;
        }
        None
    }

    /// The root ancestor of a command.
    pub fn root_of(&self, id: CommandId) -> CommandId {
        *self.chain(id).first().expect("chain contains the id itself")
    }

    /// Returns true if `id` is `root` or sits anywhere below it.
    pub fn is_under(&self, root: CommandId, id: CommandId) -> bool {
        self.chain(id).contains(&root)
    }

    /// The command's tagged usage label.
    pub fn label(&self, id: CommandId) -> String {
        self.label_with_errors(id, &[])
    }

    /// The command's plain usage label, tags stripped.
    pub fn plain_label(&self, id: CommandId) -> String {
        strip_tags(&self.label(id))
    }

    fn label_with_errors(&self, id: CommandId, error_indices: &[usize]) -> String {
        self.all_tokens(id)
            .iter()
            .enumerate()
            .map(|(index, token)| token.label(error_indices.contains(&index)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rebinds a command under a new parent (or makes it a root).
    ///
    /// Rejects unknown ids, rebinds that would create a parent cycle, and
    /// rebinds that would leave a greedy token anywhere but the end of an
    /// affected chain.
    pub fn mount(&mut self, id: CommandId, parent: Option<CommandId>) -> Result<()> {
        if !self.index.contains_key(&id) {
            return Err(CommandError::configuration("cannot mount an unknown command"));
        }
        if let Some(parent) = parent {
            if !self.index.contains_key(&parent) {
                return Err(CommandError::configuration(
                    "cannot mount under an unregistered parent",
                ));
            }
            if parent == id || self.chain(parent).contains(&id) {
                return Err(CommandError::configuration(format!(
                    "mounting \"{}\" under \"{}\" would create a parent cycle",
                    self.plain_label(id),
                    self.plain_label(parent)
                )));
            }
        }

        let previous = {
            let position = self.index[&id];
            std::mem::replace(&mut self.commands[position].parent, parent)
        };

        // the new chain must keep greedy tokens terminal for the mounted
        // command and everything below it
        let result = self.validate_subtree_chains(id);
        if let Err(err) = result {
            let position = self.index[&id];
            self.commands[position].parent = previous;
            return Err(err);
        }
        Ok(())
    }

    fn validate_subtree_chains(&self, root: CommandId) -> Result<()> {
        for command in &self.commands {
            if self.is_under(root, command.id) {
                self.validate_chain(command.id)?;
            }
        }
        Ok(())
    }

    fn validate_chain(&self, id: CommandId) -> Result<()> {
        let tokens = self.all_tokens(id);
        for token in tokens.iter().rev().skip(1) {
            if token.is_greedy() {
                return Err(CommandError::configuration(format!(
                    "greedy tokens are only valid at the end of a chain: \"{}\"",
                    self.plain_label(id)
                )));
            }
        }
        Ok(())
    }

    /// Classifies an argument list against one command.
    pub fn match_args(&self, id: CommandId, args: &[String]) -> CommandMatch {
        let command = self.expect(id);
        let label = self.label(id);

        if !command.is_executable() {
            return CommandMatch {
                id,
                label,
                error_label: None,
                kind: MatchKind::Invalid,
            };
        }

        let tokens = self.all_tokens(id);
        let mut mismatches: Vec<TokenMismatch> = Vec::new();

        for (index, arg) in args.iter().enumerate() {
            // locate the token for this position; a greedy tail absorbs
            // every argument beyond the chain length
            let (token_index, token) = if index < tokens.len() {
                (index, tokens[index])
            } else {
                match tokens.last() {
                    Some(last) if last.is_greedy() => (tokens.len() - 1, *last),
                    _ => {
                        return CommandMatch {
                            id,
                            label,
                            error_label: None,
                            kind: MatchKind::Invalid,
                        }
                    }
                }
            };

            match token.matches(arg) {
                Ok(true) => {}
                Ok(false) => {
                    return CommandMatch {
                        id,
                        label,
                        error_label: None,
                        kind: MatchKind::Invalid,
                    }
                }
                Err(err) => {
                    // the command might still be the intended one; keep
                    // scanning and record the failure
                    mismatches.push(TokenMismatch::new(
                        token_index,
                        token.label(false),
                        err,
                        arg,
                    ));
                }
            }
        }

        let missing = tokens
            .iter()
            .enumerate()
            .skip(args.len())
            .find(|(_, token)| !token.is_optional())
            .map(|(_, token)| token.label(false));

        let error_label = if mismatches.is_empty() {
            None
        } else {
            let indices: Vec<usize> = mismatches.iter().map(|m| m.token_index).collect();
            Some(self.label_with_errors(id, &indices))
        };

        let kind = if missing.is_some() {
            MatchKind::Partial {
                missing,
                mismatches,
            }
        } else if !mismatches.is_empty() {
            MatchKind::Partial {
                missing: None,
                mismatches,
            }
        } else {
            MatchKind::Exact
        };

        CommandMatch {
            id,
            label,
            error_label,
            kind,
        }
    }

    /// Matches an argument list against every executable command.
    pub fn resolve(&self, args: &[String]) -> MatchSet {
        let matches = self
            .commands
            .iter()
            .filter(|command| command.is_executable())
            .map(|command| self.match_args(command.id, args))
            .collect();
        MatchSet::new(matches)
    }

    /// Moves every command of `other` into this registry.
    pub(crate) fn merge(&mut self, other: CommandRegistry) {
        for command in other.commands {
            self.index.insert(command.id, self.commands.len());
            self.commands.push(command);
        }
    }

    /// Builds a descriptive snapshot of all commands for help rendering
    /// and the reserved injection key.
    pub fn catalog(&self) -> CommandCatalog {
        let entries = self
            .commands
            .iter()
            .map(|command| CatalogEntry {
                id: command.id,
                parent: command.parent,
                root: self.root_of(command.id),
                label: self.label(command.id),
                plain_label: self.plain_label(command.id),
                group: self.effective_group(command.id).cloned(),
                description: command.description.clone(),
                is_abstract: command.is_abstract,
                executable: command.is_executable(),
                tokens: command
                    .tokens
                    .iter()
                    .filter(|token| token.name().is_some())
                    .filter(|token| {
                        token.description().is_some() || !token.choice_values().is_empty()
                    })
                    .map(|token| TokenDoc {
                        label: strip_tags(&token.label(false)),
                        description: token.description().map(str::to_owned),
                        choices: token.choice_values().to_vec(),
                    })
                    .collect(),
            })
            .collect();
        CommandCatalog { entries }
    }
}

/// A descriptive snapshot of the registry at one point in time.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    /// One entry per registered command, in registration order.
    pub entries: Vec<CatalogEntry>,
}

impl CommandCatalog {
    /// Root entries (commands without a parent), sorted by label.
    pub fn roots(&self) -> Vec<&CatalogEntry> {
        let mut roots: Vec<&CatalogEntry> =
            self.entries.iter().filter(|e| e.parent.is_none()).collect();
        roots.sort_by(|a, b| a.plain_label.cmp(&b.plain_label));
        roots
    }

    /// Executable entries whose chain passes through `root`, in
    /// registration order.
    pub fn under(&self, root: CommandId) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.executable)
            .filter(|entry| {
                entry.id == root || self.chain_contains(entry, root)
            })
            .collect()
    }

    fn chain_contains(&self, entry: &CatalogEntry, root: CommandId) -> bool {
        let mut current = entry.parent;
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self
                .entries
                .iter()
                .find(|candidate| candidate.id == id)
                .and_then(|candidate| candidate.parent);
        }
        false
    }
}

/// One command's descriptive snapshot.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: CommandId,
    pub parent: Option<CommandId>,
    pub root: CommandId,
    /// Tagged usage label of the full chain.
    pub label: String,
    /// The label with tags stripped.
    pub plain_label: String,
    pub group: Option<Group>,
    pub description: Option<String>,
    pub is_abstract: bool,
    pub executable: bool,
    /// Documented named tokens (own tokens only).
    pub tokens: Vec<TokenDoc>,
}

/// Help documentation for one named token.
#[derive(Debug, Clone)]
pub struct TokenDoc {
    pub label: String,
    pub description: Option<String>,
    pub choices: Vec<String>,
}
