//! Error types for parley.
//!
//! Defines the error values produced during matching, argument building,
//! dependency injection, and command execution, plus the machine-readable
//! error codes carried on results.

use serde_json::Value;
use thiserror::Error;

/// Machine-readable error codes attached to failed results and errors.
pub mod code {
    /// No registered command matched the input.
    pub const INVALID_COMMAND: &str = "INVALID_COMMAND";
    /// A command matched but one of its arguments was malformed.
    pub const INVALID_ARGUMENT_FORMAT: &str = "INVALID_ARGUMENT_FORMAT";
    /// More than one command resolved exactly for the same input.
    pub const AMBIGUOUS_COMMAND: &str = "AMBIGUOUS_COMMAND";
    /// A requested injection key had no provider and no default.
    pub const MISSING_DEPENDENCY: &str = "MISSING_DEPENDENCY";
    /// The output transport asked the command to reduce its output rate.
    pub const SHOULD_THROTTLE: &str = "SHOULD_THROTTLE";
    /// A registration or mount call was structurally invalid.
    pub const INVALID_CONFIGURATION: &str = "INVALID_CONFIGURATION";
}

/// A validation failure for a single argument value.
///
/// Raised by validators and transform syntax checks. During matching these
/// are collected as token mismatches; during argument building they are
/// promoted to [`CommandError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable description of the failed constraint.
    pub message: String,
    /// Name of the argument the failure belongs to, if known.
    pub field: Option<String>,
}

impl ValidationError {
    /// Creates a validation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Attaches the field name the failure belongs to.
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Error raised while dispatching or executing a command.
///
/// Carries everything the host needs to render or serialize the failure:
/// a message, optional structured data, an exit status, and an opaque
/// machine-readable code.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandError {
    /// Human-readable error description (may contain inline style tags).
    pub message: String,
    /// Optional structured payload for machine consumers.
    pub data: Option<Value>,
    /// Exit status signalled to the host. Defaults to 1.
    pub status: i32,
    /// Machine-readable error identifier, see [`code`].
    pub code: Option<String>,
    /// Label of the offending argument token, if known.
    pub field: Option<String>,
}

impl CommandError {
    /// Creates a command error with the given message and default status 1.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            status: 1,
            code: None,
            field: None,
        }
    }

    /// Attaches structured data to the error.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Overrides the exit status.
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Attaches a machine-readable error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Creates an invalid-argument error for the given field label.
    pub fn invalid_argument(field: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        let rendered = match field {
            Some(field) => format!("Invalid argument for field {field}: {message}"),
            None => format!("Invalid argument: {message}"),
        };
        Self {
            field: field.map(str::to_owned),
            ..Self::new(rendered).with_code(code::INVALID_ARGUMENT_FORMAT)
        }
    }

    /// Creates an injection error naming the missing key and the parameter
    /// it was bound to. This indicates a registration mistake, not bad
    /// user input.
    pub fn injection(key: &str, bind_as: &str) -> Self {
        Self::new(format!(
            "No provider offered a value for key \"{key}\" (bound as \"{bind_as}\") \
             and no default was configured"
        ))
        .with_code(code::MISSING_DEPENDENCY)
    }

    /// Creates a configuration error for invalid registration or mount calls.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(message).with_code(code::INVALID_CONFIGURATION)
    }

    /// Creates a backpressure error instructing the command to reduce its
    /// output rate.
    pub fn should_throttle() -> Self {
        Self::new("The output transport cannot keep up; reduce the output rate")
            .with_code(code::SHOULD_THROTTLE)
    }
}

impl From<ValidationError> for CommandError {
    fn from(err: ValidationError) -> Self {
        CommandError::invalid_argument(err.field.as_deref(), err.message)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::new(err.to_string())
    }
}

/// Two or more commands resolved exactly for the same input.
///
/// This is a configuration bug on the command author's side, never a user
/// input problem: two registered commands share an identical resolvable
/// shape and must be disentangled.
#[derive(Debug, Clone, Error)]
#[error("ambiguous command: {} commands match exactly: {}", labels.len(), labels.join(", "))]
pub struct AmbiguousCommandError {
    /// Labels of all commands that matched exactly.
    pub labels: Vec<String>,
}

impl From<AmbiguousCommandError> for CommandError {
    fn from(err: AmbiguousCommandError) -> Self {
        CommandError::new(err.to_string()).with_code(code::AMBIGUOUS_COMMAND)
    }
}

/// Result type alias using CommandError.
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("must be an integer");
        assert_eq!(err.to_string(), "must be an integer");
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_validation_error_for_field() {
        let err = ValidationError::new("has invalid format").for_field("name");
        assert_eq!(err.field.as_deref(), Some("name"));
    }

    #[test]
    fn test_command_error_defaults() {
        let err = CommandError::new("boom");
        assert_eq!(err.status, 1);
        assert_eq!(err.code, None);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_invalid_argument_names_field() {
        let err = CommandError::invalid_argument(Some("NAME"), "has invalid format");
        assert_eq!(err.code.as_deref(), Some(code::INVALID_ARGUMENT_FORMAT));
        assert!(err.to_string().contains("NAME"));
        assert!(err.to_string().contains("has invalid format"));
    }

    #[test]
    fn test_injection_error_names_key_and_parameter() {
        let err = CommandError::injection("members", "names");
        assert_eq!(err.code.as_deref(), Some(code::MISSING_DEPENDENCY));
        assert!(err.to_string().contains("members"));
        assert!(err.to_string().contains("names"));
    }

    #[test]
    fn test_validation_error_promotes_to_command_error() {
        let err: CommandError = ValidationError::new("must be one of: a, b")
            .for_field("state")
            .into();
        assert_eq!(err.code.as_deref(), Some(code::INVALID_ARGUMENT_FORMAT));
        assert_eq!(err.field.as_deref(), Some("state"));
    }

    #[test]
    fn test_ambiguous_error_lists_labels() {
        let err = AmbiguousCommandError {
            labels: vec!["say hello".into(), "say <word>".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 commands"));
        assert!(msg.contains("say hello"));
        let cmd: CommandError = err.into();
        assert_eq!(cmd.code.as_deref(), Some(code::AMBIGUOUS_COMMAND));
    }

    #[test]
    fn test_anyhow_interop() {
        let err: CommandError = anyhow::anyhow!("backend unavailable").into();
        assert_eq!(err.to_string(), "backend unavailable");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CommandError>();
        assert_send_sync::<ValidationError>();
    }
}
