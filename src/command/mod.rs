//! Command model: registered handlers plus their token chains.
//!
//! A [`Command`] couples a token chain with a handler, an optional parent
//! link (abstract base commands contribute a shared token/injection prefix
//! to their children), a descriptive group, and the dependencies it wants
//! injected. Commands are owned exclusively by the registry; handles are
//! opaque [`CommandId`]s that stay valid when commanders are composed.

pub mod builder;
pub mod matching;
pub mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::inject::{Injected, Injection};
use crate::result::CommandStream;
use crate::token::Token;
use crate::validation::Validator;

pub use builder::CommandBuilder;
pub use matching::{CommandMatch, MatchKind, MatchSet, TokenMismatch};
pub use registry::{CatalogEntry, CommandCatalog, CommandRegistry, TokenDoc};

/// Opaque handle to a registered command.
///
/// Ids come from a process-wide counter, so they survive merging several
/// commanders into one dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

impl CommandId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        CommandId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A purely descriptive grouping used by help rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub description: Option<String>,
}

impl Group {
    /// Creates a group with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Attaches a description shown in help output.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A command body: takes the bound invocation, returns a lazy stream of
/// outputs.
pub type Handler = Arc<dyn Fn(Invocation) -> CommandStream + Send + Sync>;

/// Whether a command is administratively disabled.
#[derive(Clone, Default)]
pub enum Disabled {
    /// The command is enabled.
    #[default]
    No,
    /// The command is disabled.
    Yes,
    /// Decided per dispatch by a predicate over the command.
    When(Arc<dyn Fn(&Command) -> bool + Send + Sync>),
}

impl fmt::Debug for Disabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disabled::No => f.write_str("Disabled::No"),
            Disabled::Yes => f.write_str("Disabled::Yes"),
            Disabled::When(_) => f.write_str("Disabled::When(..)"),
        }
    }
}

/// A registered command.
#[derive(Clone)]
pub struct Command {
    pub(crate) id: CommandId,
    pub(crate) tokens: Vec<Token>,
    pub(crate) parent: Option<CommandId>,
    pub(crate) is_abstract: bool,
    pub(crate) group: Option<Group>,
    pub(crate) injections: Vec<Injection>,
    pub(crate) validators: Vec<(String, Validator)>,
    pub(crate) disabled: Disabled,
    pub(crate) description: Option<String>,
    pub(crate) handler: Option<Handler>,
}

impl Command {
    /// Returns the command's handle.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Returns the command's own tokens (parents excluded).
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the parent handle, if mounted under one.
    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    /// Returns true if this command only exists to be inherited from.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns the command's own group (ancestors not consulted).
    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    /// Returns the command's own injections (parents excluded).
    pub fn injections(&self) -> &[Injection] {
        &self.injections
    }

    /// Returns the help description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Evaluates the disabled predicate.
    pub fn is_disabled(&self) -> bool {
        match &self.disabled {
            Disabled::No => false,
            Disabled::Yes => true,
            Disabled::When(predicate) => predicate(self),
        }
    }

    /// An abstract or disabled command is never matched or dispatched.
    pub fn is_executable(&self) -> bool {
        !self.is_abstract && !self.is_disabled()
    }

    pub(crate) fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("tokens", &self.tokens.len())
            .field("parent", &self.parent)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

/// Positional arguments bound by name after matching and transformation.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: HashMap<String, Value>,
}

impl Args {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the bound value for a variable name. Optional variables the
    /// user omitted are absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the bound value as a string slice.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Returns the bound value as an integer.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    /// Returns the bound value as a boolean.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    /// Returns the bound value as an array (greedy variables).
    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name)?.as_array().map(Vec::as_slice)
    }

    /// Returns true if a value was bound under the name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Everything a handler receives: bound arguments plus resolved
/// dependencies.
#[derive(Debug)]
pub struct Invocation {
    /// Arguments bound from the input line.
    pub args: Args,
    /// Resolved injections, keyed by bind name.
    pub injected: Injected,
}
