//! Command results and dispatch outcomes.
//!
//! Command bodies produce a lazy stream of outputs: zero or more
//! [`CommandResult`] values, interleaved with explicit [`ControlAction`]s
//! for state transitions (exit, stop) that the source system signalled by
//! unwinding. The host drains the stream one item at a time — a command may
//! block between successive items, and pulling lazily is what makes
//! interruption and backpressure possible.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CommandError, Result};

/// The outcome of a successfully produced piece of command output.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command step succeeded.
    pub success: bool,
    /// Renderable message; may contain inline style tags.
    pub message: String,
    /// Optional structured payload for machine consumers.
    pub data: Option<Value>,
    /// Exit status for the host. Defaults to 0.
    pub status: i32,
    /// Machine-readable error identifier, if any.
    pub code: Option<String>,
}

impl CommandResult {
    /// Creates a successful result with the given message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            status: 0,
            code: None,
        }
    }

    /// Creates a failed result with the given message and status 1.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            status: 1,
            code: None,
        }
    }

    /// Attaches structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Overrides the status.
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Attaches a machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the machine wire shape of this result.
    pub fn wire(&self) -> WireResult<'_> {
        WireResult {
            data: self.data.as_ref(),
            status: self.status,
            code: self.code.as_deref(),
        }
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<CommandError> for CommandResult {
    fn from(err: CommandError) -> Self {
        Self {
            success: false,
            message: err.message,
            data: err.data,
            status: err.status,
            code: err.code,
        }
    }
}

/// The `{data, status, code}` shape serialized for non-interactive
/// (machine) consumers.
#[derive(Debug, Serialize)]
pub struct WireResult<'a> {
    pub data: Option<&'a Value>,
    pub status: i32,
    pub code: Option<&'a str>,
}

/// Host-visible state transitions requested by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// The user asked to leave the interpreter.
    Exit,
    /// Stop processing the current dispatch; the host keeps its last
    /// status instead of assigning a new one.
    Stop,
}

/// One item of a command's output stream.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// A produced result.
    Result(CommandResult),
    /// A requested state transition.
    Control(ControlAction),
}

impl From<CommandResult> for CommandOutput {
    fn from(result: CommandResult) -> Self {
        CommandOutput::Result(result)
    }
}

/// A lazy, pull-based sequence of command outputs.
pub type CommandStream = Box<dyn Iterator<Item = Result<CommandOutput>> + Send>;

/// A stream yielding nothing.
pub fn stream_empty() -> CommandStream {
    Box::new(std::iter::empty())
}

/// A stream yielding a single result.
pub fn stream_one(result: CommandResult) -> CommandStream {
    Box::new(std::iter::once(Ok(CommandOutput::Result(result))))
}

/// A stream yielding the given results in order.
pub fn stream_results(results: Vec<CommandResult>) -> CommandStream {
    Box::new(
        results
            .into_iter()
            .map(|result| Ok(CommandOutput::Result(result))),
    )
}

/// A stream yielding a single control action.
pub fn stream_control(action: ControlAction) -> CommandStream {
    Box::new(std::iter::once(Ok(CommandOutput::Control(action))))
}

/// A stream yielding a single error.
pub fn stream_error(err: CommandError) -> CommandStream {
    Box::new(std::iter::once(Err(err)))
}

/// The outcome of dispatching one input line.
pub enum DispatchOutcome {
    /// The line was blank or a comment; nothing was resolved.
    SkipLine,
    /// The line resolved; drain the stream lazily, one item at a time.
    Results(CommandStream),
}

impl DispatchOutcome {
    /// Drains the stream eagerly and returns the produced results.
    ///
    /// Stops at the first control action; a skipped line yields no
    /// results. Prefer draining [`DispatchOutcome::Results`] manually when
    /// the host needs interruption or backpressure.
    pub fn collect_results(self) -> Result<Vec<CommandResult>> {
        match self {
            DispatchOutcome::SkipLine => Ok(Vec::new()),
            DispatchOutcome::Results(stream) => {
                let mut results = Vec::new();
                for item in stream {
                    match item? {
                        CommandOutput::Result(result) => results.push(result),
                        CommandOutput::Control(_) => break,
                    }
                }
                Ok(results)
            }
        }
    }
}

impl std::fmt::Debug for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::SkipLine => f.write_str("SkipLine"),
            DispatchOutcome::Results(_) => f.write_str("Results(..)"),
        }
    }
}
