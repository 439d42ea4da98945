//! Fluent command registration.
//!
//! A [`CommandBuilder`] collects a command's tokens, parent, group,
//! injections, validators, and handler, then registers it and returns the
//! opaque [`CommandId`] handle. Builders are obtained from
//! [`Commander::command`](crate::commander::Commander::command).

use std::sync::Arc;

use crate::error::{CommandError, Result};
use crate::inject::Injection;
use crate::result::CommandStream;
use crate::token::Token;
use crate::validation::Validator;

use super::registry::CommandRegistry;
use super::{Command, CommandId, Disabled, Group, Invocation};

/// Builder for one command registration.
pub struct CommandBuilder<'r> {
    registry: &'r mut CommandRegistry,
    tokens: Vec<Token>,
    parent: Option<CommandId>,
    is_abstract: bool,
    group: Option<Group>,
    injections: Vec<Injection>,
    validators: Vec<(String, Validator)>,
    disabled: Disabled,
    description: Option<String>,
    handler: Option<super::Handler>,
}

impl<'r> CommandBuilder<'r> {
    pub(crate) fn new(registry: &'r mut CommandRegistry) -> Self {
        Self {
            registry,
            tokens: Vec::new(),
            parent: None,
            is_abstract: false,
            group: None,
            injections: Vec::new(),
            validators: Vec::new(),
            disabled: Disabled::No,
            description: None,
            handler: None,
        }
    }

    /// Appends one token to the command's own chain.
    pub fn token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Appends several tokens to the command's own chain.
    pub fn tokens(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    /// Mounts the command under a previously registered parent, inheriting
    /// its token and injection prefix.
    pub fn parent(mut self, parent: CommandId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Marks the command as abstract: never matched or dispatched, it only
    /// exists to be a parent.
    pub fn abstract_command(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Assigns the command to a descriptive group for help rendering.
    pub fn group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Declares a dependency resolved at dispatch time.
    pub fn inject(mut self, injection: Injection) -> Self {
        self.injections.push(injection);
        self
    }

    /// Attaches a validator run against the named argument after
    /// resolution, during argument building.
    pub fn validate_arg(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.validators.push((name.into(), validator));
        self
    }

    /// Disables the command unconditionally.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = if disabled { Disabled::Yes } else { Disabled::No };
        self
    }

    /// Disables the command whenever the predicate returns true.
    pub fn disabled_when(
        mut self,
        predicate: impl Fn(&Command) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.disabled = Disabled::When(Arc::new(predicate));
        self
    }

    /// Attaches a help description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches the command body.
    pub fn handler(
        mut self,
        handler: impl Fn(Invocation) -> CommandStream + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Registers the command and returns its handle.
    pub fn register(self) -> Result<CommandId> {
        if !self.is_abstract && self.handler.is_none() {
            return Err(CommandError::configuration(
                "a non-abstract command needs a handler",
            ));
        }
        self.registry.insert(Command {
            id: CommandId::next(),
            tokens: self.tokens,
            parent: self.parent,
            is_abstract: self.is_abstract,
            group: self.group,
            injections: self.injections,
            validators: self.validators,
            disabled: self.disabled,
            description: self.description,
            handler: self.handler,
        })
    }
}
