//! The commander facade.
//!
//! A [`Commander`] ties the pieces together: it owns the command registry
//! and the provider registry, hands out registration builders, and
//! orchestrates dispatch — tokenize the line, match it against every
//! executable command, execute the unique exact match (binding arguments
//! and resolving injections), or render suggestions when resolution fails.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::command::{
    matching, Args, CommandBuilder, CommandId, CommandRegistry, Invocation, MatchSet,
};
use crate::config::CommanderConfig;
use crate::error::{CommandError, Result};
use crate::inject::{build_injected, DynValue, ProviderRegistry, ScopedProvider};
use crate::result::{stream_error, stream_one, CommandResult, CommandStream, DispatchOutcome};
use crate::token::Token;
use crate::tokenizer::{tokenize, Tokenized};

/// Reserved injection key resolving to a [`CommandCatalog`] snapshot of
/// all registered commands.
///
/// [`CommandCatalog`]: crate::command::CommandCatalog
pub const COMMANDS_KEY: &str = "commands";

/// The public registration and dispatch API.
pub struct Commander {
    config: CommanderConfig,
    registry: CommandRegistry,
    providers: ProviderRegistry,
}

impl Commander {
    /// Creates a commander with the given display name and default
    /// settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(CommanderConfig::named(name))
    }

    /// Creates a commander from a full configuration.
    pub fn with_config(config: CommanderConfig) -> Self {
        Self {
            config,
            registry: CommandRegistry::new(),
            providers: ProviderRegistry::new(),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configured description.
    pub fn description(&self) -> Option<&str> {
        self.config.description.as_deref()
    }

    /// Starts a command registration.
    pub fn command(&mut self) -> CommandBuilder<'_> {
        CommandBuilder::new(&mut self.registry)
    }

    /// Rebinds a registered command under a new parent (or makes it a
    /// root). Rejects rebinds that would create a parent cycle.
    pub fn mount(&mut self, id: CommandId, parent: Option<CommandId>) -> Result<()> {
        self.registry.mount(id, parent)
    }

    /// Returns the command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Provides a value under `key` for the lifetime of the returned
    /// guard. Call [`ScopedProvider::persist`] to keep it for the
    /// commander's lifetime.
    #[must_use = "dropping the guard immediately removes the provided value"]
    pub fn provide<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> ScopedProvider {
        self.providers.provide(key, value)
    }

    /// Provides a getter invoked fresh on every resolution, for values
    /// that change between dispatches.
    #[must_use = "dropping the guard immediately removes the provided value"]
    pub fn provide_getter<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        getter: impl Fn() -> T + Send + Sync + 'static,
    ) -> ScopedProvider {
        self.providers.provide_getter(key, getter)
    }

    /// Merges other commanders into this one: their commands join this
    /// registry and their providers are consulted after this one's.
    pub fn compose(&mut self, others: impl IntoIterator<Item = Commander>) -> &mut Self {
        for other in others {
            debug!(name = %other.config.name, "composing commander");
            self.registry.merge(other.registry);
            self.providers.chain(other.providers);
        }
        self
    }

    /// Resolves every value offered for an injection key: the reserved
    /// commands catalog first, then provided values, then composed
    /// commanders.
    fn require_values(&self, key: &str) -> Vec<DynValue> {
        let mut values: Vec<DynValue> = Vec::new();
        if key == COMMANDS_KEY {
            values.push(std::sync::Arc::new(self.registry.catalog()));
        }
        values.extend(self.providers.require(key));
        values
    }

    /// Tokenizes and resolves a line, then executes the winning command.
    ///
    /// The returned stream must be drained lazily, one item at a time: a
    /// command body may block between successive results, and pulling
    /// incrementally is what allows interruption and backpressure.
    pub fn dispatch(&self, line: &str) -> DispatchOutcome {
        self.dispatch_line(line, false)
    }

    /// Like [`dispatch`](Self::dispatch), but instead of executing
    /// anything yields one result describing every match grouped by type.
    pub fn simulate(&self, line: &str) -> DispatchOutcome {
        self.dispatch_line(line, true)
    }

    fn dispatch_line(&self, line: &str, simulate: bool) -> DispatchOutcome {
        let args = match tokenize(line, &self.config.comment_marker) {
            Tokenized::Skip => return DispatchOutcome::SkipLine,
            Tokenized::Args(args) => args,
        };

        debug!(?args, simulate, "dispatching");
        let matches = self.resolve(&args);

        if simulate {
            return DispatchOutcome::Results(stream_one(CommandResult::ok(
                matches.describe(&args),
            )));
        }

        let stream = match matches.exact() {
            Err(ambiguous) => {
                error!(%ambiguous, "two commands share an identical resolvable shape");
                stream_error(ambiguous.into())
            }
            Ok(Some(winner)) => self.execute(winner.id, &args),
            Ok(None) => {
                warn!(?args, "no exact match, rendering suggestions");
                let resolve = |prefix: &[String]| self.resolve(prefix);
                stream_one(matching::suggest(&args, &matches, &resolve))
            }
        };
        DispatchOutcome::Results(stream)
    }

    /// Dispatches a line and eagerly collects the produced results,
    /// stopping at the first control action.
    pub fn fire(&self, line: &str) -> Result<Vec<CommandResult>> {
        self.dispatch(line).collect_results()
    }

    /// Matches an argument list against every executable command.
    pub fn resolve(&self, args: &[String]) -> MatchSet {
        self.registry.resolve(args)
    }

    fn execute(&self, id: CommandId, args: &[String]) -> CommandStream {
        let tokens = self.registry.all_tokens(id);

        let bound = match bind_args(&tokens, args) {
            Ok(bound) => bound,
            Err(err) => return stream_error(err),
        };

        let command = self
            .registry
            .get(id)
            .expect("resolved command belongs to this registry");

        for (field, validator) in &command.validators {
            let Some(value) = bound.get(field) else {
                continue;
            };
            if let Err(err) = validator.validate(value) {
                let label = tokens
                    .iter()
                    .find(|token| token.name() == Some(field.as_str()))
                    .map(|token| token.label(false))
                    .unwrap_or_else(|| field.clone());
                return stream_error(CommandError::invalid_argument(Some(&label), err.message));
            }
        }

        let injections: Vec<_> = self
            .registry
            .all_injections(id)
            .into_iter()
            .cloned()
            .collect();
        let injected = match build_injected(&injections, |key| self.require_values(key)) {
            Ok(injected) => injected,
            Err(err) => {
                error!(%err, "dependency injection failed");
                return stream_error(err);
            }
        };

        let handler = command
            .handler()
            .expect("executable commands carry a handler")
            .clone();
        (*handler)(Invocation {
            args: bound,
            injected,
        })
    }
}

impl std::fmt::Debug for Commander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commander")
            .field("name", &self.config.name)
            .field("commands", &self.registry.len())
            .finish()
    }
}

/// Binds raw arguments to variable names along the token chain, applying
/// transforms. A greedy token absorbs every remaining argument into one
/// array value; optional tokens simply stop binding once the arguments
/// run out.
fn bind_args(tokens: &[&Token], args: &[String]) -> Result<Args> {
    let mut queue: VecDeque<String> = args.iter().cloned().collect();
    let mut bound = Args::default();

    for token in tokens {
        if queue.is_empty() {
            break;
        }
        match token.name() {
            Some(name) => {
                let raw = if token.is_greedy() {
                    Value::Array(queue.drain(..).map(Value::String).collect())
                } else {
                    Value::String(queue.pop_front().expect("queue checked non-empty"))
                };
                let value = token.bind(raw).map_err(|err| {
                    CommandError::invalid_argument(Some(&token.label(false)), err.message)
                })?;
                bound.insert(name, value);
            }
            None => {
                queue.pop_front();
            }
        }
    }

    Ok(bound)
}
