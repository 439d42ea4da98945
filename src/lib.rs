//! parley - A line-based command interpreter toolkit.
//!
//! Given a space-separated input line, parley resolves the best-matching
//! registered command, validates and transforms its arguments, injects
//! contextual dependencies, and executes the command body as a lazy stream
//! of structured results.
//!
//! # Modules
//!
//! - [`builtin`] - Ready-made `help` and `quit` command sets
//! - [`command`] - Command model, registry, builder, and match classification
//! - [`commander`] - The public registration and dispatch facade
//! - [`config`] - Host-embeddable interpreter settings
//! - [`error`] - Error types and machine-readable error codes
//! - [`inject`] - Dependency injection and layered providers
//! - [`render`] - Inline style tags and text layout helpers
//! - [`result`] - Command results, control actions, dispatch outcomes
//! - [`throttle`] - Backpressure handling for result streams
//! - [`token`] - Token model for command patterns
//! - [`tokenizer`] - Input line tokenization
//! - [`transform`] - Composable argument transforms
//! - [`validation`] - Composable argument validators
//!
//! # Example
//!
//! ```
//! use parley::{lit, var, Commander, CommandResult};
//! use parley::result::stream_one;
//!
//! let mut commander = Commander::new("demo");
//! commander
//!     .command()
//!     .tokens([lit("say"), var("word")])
//!     .handler(|inv| {
//!         let word = inv.args.str("word").unwrap_or_default().to_owned();
//!         stream_one(CommandResult::ok(word))
//!     })
//!     .register()
//!     .unwrap();
//!
//! let results = commander.fire("say hello").unwrap();
//! assert_eq!(results[0].message, "hello");
//! ```

pub mod builtin;
pub mod command;
pub mod commander;
pub mod config;
pub mod error;
pub mod inject;
pub mod render;
pub mod result;
pub mod throttle;
pub mod token;
pub mod tokenizer;
pub mod transform;
pub mod validation;

pub use command::{CommandBuilder, CommandCatalog, CommandId, Group, Invocation, MatchSet};
pub use commander::{Commander, COMMANDS_KEY};
pub use config::CommanderConfig;
pub use error::{AmbiguousCommandError, CommandError, Result, ValidationError};
pub use inject::{require, Injection, ProviderRegistry, ScopedProvider};
pub use result::{CommandOutput, CommandResult, ControlAction, DispatchOutcome};
pub use token::{lit, var, Token};
pub use transform::{Transform, TransformChain};
pub use validation::Validator;
